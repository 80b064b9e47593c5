//! Member-rebinding lens.
//!
//! Code references members through whatever holder the source named, not
//! necessarily the class that declares the member. Rebinding resolves every
//! reference the program makes to its declaring class and records the result,
//! so that later passes (access widening, merging) can reason about the
//! declaration a call site actually binds to.
//!
//! Signatures never change here: the lens only installs the rebound
//! reference in lookup results.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::{
    graph::{
        FieldRef, MethodRef, ProgramGraph, ReferencedMembersCollector, ReferencedMembersConsumer,
    },
    lens::{FieldLookupResult, MethodLookupResult},
};

/// Immutable lens mapping non-rebound member references to their rebound
/// counterparts.
#[derive(Debug, Default)]
pub struct MemberRebindingLens {
    field_rebindings: HashMap<FieldRef, FieldRef>,
    method_rebindings: HashMap<MethodRef, MethodRef>,
}

impl MemberRebindingLens {
    /// Starts building a member-rebinding lens.
    pub fn builder() -> MemberRebindingLensBuilder {
        MemberRebindingLensBuilder::default()
    }

    /// Builds the lens by sweeping every member reference in the program and
    /// resolving it to its declaring class.
    pub fn create(graph: &ProgramGraph) -> Self {
        struct Seeder<'a> {
            builder: &'a MemberRebindingLensBuilder,
            graph: &'a ProgramGraph,
        }

        impl ReferencedMembersConsumer for Seeder<'_> {
            fn on_field_reference(&self, field: &FieldRef, _context: &MethodRef) {
                self.builder.record_field_access(field, self.graph);
            }

            fn on_method_reference(&self, method: &MethodRef, _context: &MethodRef) {
                self.builder.record_method_access(method, self.graph);
            }
        }

        let builder = Self::builder();
        ReferencedMembersCollector::new(
            graph,
            Seeder {
                builder: &builder,
                graph,
            },
        )
        .run();
        builder.build()
    }

    /// The declaration `field` binds to, or `field` itself when it is already
    /// rebound or resolves outside the program.
    pub fn rebound_field_reference(&self, field: &FieldRef) -> FieldRef {
        self.field_rebindings.get(field).cloned().unwrap_or_else(|| field.clone())
    }

    /// The declaration `method` binds to, or `method` itself.
    pub fn rebound_method_reference(&self, method: &MethodRef) -> MethodRef {
        self.method_rebindings.get(method).cloned().unwrap_or_else(|| method.clone())
    }

    pub(crate) fn describe_lookup_field(&self, previous: FieldLookupResult) -> FieldLookupResult {
        let rebound_reference = self.rebound_field_reference(&previous.rebound_reference);
        if rebound_reference != previous.rebound_reference {
            FieldLookupResult {
                reference: previous.reference,
                rebound_reference,
            }
        } else {
            previous
        }
    }

    pub(crate) fn describe_lookup_method(&self, previous: MethodLookupResult) -> MethodLookupResult {
        let rebound_reference = self.rebound_method_reference(&previous.rebound_reference);
        if rebound_reference != previous.rebound_reference {
            MethodLookupResult {
                reference: previous.reference,
                rebound_reference,
                invoke_kind: previous.invoke_kind,
            }
        } else {
            previous
        }
    }
}

/// Builder for [`MemberRebindingLens`], safe for concurrent recording.
#[derive(Debug, Default)]
pub struct MemberRebindingLensBuilder {
    field_rebindings: DashMap<FieldRef, FieldRef>,
    method_rebindings: DashMap<MethodRef, MethodRef>,
}

impl MemberRebindingLensBuilder {
    /// Resolves and records one referenced field.
    pub fn record_field_access(&self, field: &FieldRef, graph: &ProgramGraph) {
        if let Some(rebound) = graph.resolve_field(field) {
            if rebound != *field {
                self.field_rebindings.insert(field.clone(), rebound);
            }
        }
    }

    /// Resolves and records one referenced method.
    pub fn record_method_access(&self, method: &MethodRef, graph: &ProgramGraph) {
        if let Some(rebound) = graph.resolve_method(method) {
            if rebound != *method {
                self.method_rebindings.insert(method.clone(), rebound);
            }
        }
    }

    /// Freezes the builder into an immutable lens.
    #[must_use]
    pub fn build(self) -> MemberRebindingLens {
        MemberRebindingLens {
            field_rebindings: self.field_rebindings.into_iter().collect(),
            method_rebindings: self.method_rebindings.into_iter().collect(),
        }
    }
}
