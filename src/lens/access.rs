//! Access-modifier lens.
//!
//! Tracks method visibility changes made by access widening. Publicizing a
//! private method has two visible effects on call sites: the method may get a
//! fresh name (to avoid clashing with an existing virtual method), and every
//! `Direct` invoke targeting it must become `Interface` or `Virtual`
//! depending on whether the holder is an interface.
//!
//! The two publicized sets are disjoint by construction: a method is
//! classified exactly once, by its holder's kind at recording time.

use std::collections::HashSet;

use crossbeam_skiplist::SkipSet;

use crate::{
    collections::{BidirectionalOneToOneMap, ConcurrentOneToOneBuilder},
    graph::{InvokeKind, MethodRef, ProgramClass},
    lens::MethodLookupResult,
};

/// Immutable lens over one access-widening pass.
#[derive(Debug)]
pub struct AccessModifierLens {
    method_map: BidirectionalOneToOneMap<MethodRef, MethodRef>,

    // Publicized private interface methods. Invokes targeting these must be
    // rewritten from invoke-direct to invoke-interface.
    publicized_private_interface_methods: HashSet<MethodRef>,

    // Publicized private class methods. Invokes targeting these must be
    // rewritten from invoke-direct to invoke-virtual.
    publicized_private_virtual_methods: HashSet<MethodRef>,
}

impl AccessModifierLens {
    /// Starts building an access-modifier lens.
    pub fn builder() -> AccessModifierLensBuilder {
        AccessModifierLensBuilder::default()
    }

    /// The renamed signature of `method`, or `method` itself when unaffected.
    pub fn next_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.method_map.get(method).cloned().unwrap_or_else(|| method.clone())
    }

    /// The signature `method` had before this pass, or `method` itself.
    pub fn previous_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.method_map.get_key(method).cloned().unwrap_or_else(|| method.clone())
    }

    pub(crate) fn describe_lookup_method(&self, previous: MethodLookupResult) -> MethodLookupResult {
        let new_rebound = self.next_method_signature(&previous.rebound_reference);
        // Access widening renames in place; the holder only changes through
        // merging or repackaging lenses.
        debug_assert_eq!(new_rebound.holder(), previous.rebound_reference.holder());

        let mut invoke_kind = previous.invoke_kind;
        if invoke_kind.is_direct() {
            if self.publicized_private_interface_methods.contains(&new_rebound) {
                invoke_kind = InvokeKind::Interface;
            } else if self.publicized_private_virtual_methods.contains(&new_rebound) {
                invoke_kind = InvokeKind::Virtual;
            }
        }

        if invoke_kind != previous.invoke_kind || new_rebound != previous.rebound_reference {
            let reference = new_rebound.with_holder(previous.reference.holder().clone());
            MethodLookupResult {
                reference,
                rebound_reference: new_rebound,
                invoke_kind,
            }
        } else {
            previous
        }
    }
}

/// Builder for [`AccessModifierLens`], safe for concurrent recording.
///
/// Workers operate on disjoint classes; the rename map is lock protected per
/// mutation and the publicized sets are lock free.
#[derive(Default)]
pub struct AccessModifierLensBuilder {
    method_map: ConcurrentOneToOneBuilder<MethodRef, MethodRef>,
    publicized_private_interface_methods: SkipSet<MethodRef>,
    publicized_private_virtual_methods: SkipSet<MethodRef>,
}

impl AccessModifierLensBuilder {
    /// Records that a private instance method on `holder` became public.
    ///
    /// The method is classified into the interface or class set based on the
    /// holder's kind, which fixes how direct invokes against it must be
    /// rewritten.
    pub fn add_publicized_private_virtual_method(&self, holder: &ProgramClass, method: MethodRef) {
        if holder.is_interface() {
            self.publicized_private_interface_methods.insert(method);
        } else {
            self.publicized_private_virtual_methods.insert(method);
        }
    }

    /// Records a method rename. A self-move is a caller bug.
    pub fn record_move(&self, from: MethodRef, to: MethodRef) {
        assert_ne!(from, to);
        self.method_map.put(from, to);
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.method_map.is_empty()
            && self.publicized_private_interface_methods.is_empty()
            && self.publicized_private_virtual_methods.is_empty()
    }

    /// Freezes the builder into an immutable lens.
    ///
    /// An empty access-modifier lens must not be built; callers skip the pass
    /// instead.
    #[must_use]
    pub fn build(self) -> AccessModifierLens {
        assert!(!self.is_empty());
        AccessModifierLens {
            method_map: self.method_map.freeze(),
            publicized_private_interface_methods: self
                .publicized_private_interface_methods
                .iter()
                .map(|entry| entry.value().clone())
                .collect(),
            publicized_private_virtual_methods: self
                .publicized_private_virtual_methods
                .iter()
                .map(|entry| entry.value().clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ClassFlags, TypeRef};

    fn method(holder: &TypeRef, name: &str) -> MethodRef {
        MethodRef::new(
            holder.clone(),
            name,
            TypeRef::from_descriptor("V").unwrap(),
            Vec::new(),
        )
    }

    #[test]
    fn direct_invoke_becomes_virtual_on_publicized_class_method() {
        let holder_type = TypeRef::class("A");
        let holder = ProgramClass::builder(holder_type.clone()).build();
        let target = method(&holder_type, "m");

        let builder = AccessModifierLens::builder();
        builder.add_publicized_private_virtual_method(&holder, target.clone());
        let lens = builder.build();

        let result = lens.describe_lookup_method(MethodLookupResult::identity(
            target.clone(),
            InvokeKind::Direct,
        ));
        assert_eq!(result.invoke_kind, InvokeKind::Virtual);
        assert_eq!(result.reference, target);
    }

    #[test]
    fn virtual_invokes_are_never_affected_by_publicizing() {
        let holder_type = TypeRef::class("I");
        let holder = ProgramClass::builder(holder_type.clone())
            .flags(ClassFlags::PUBLIC | ClassFlags::INTERFACE | ClassFlags::ABSTRACT)
            .build();
        let target = method(&holder_type, "m");

        let builder = AccessModifierLens::builder();
        builder.add_publicized_private_virtual_method(&holder, target.clone());
        let lens = builder.build();

        let result = lens.describe_lookup_method(MethodLookupResult::identity(
            target,
            InvokeKind::Virtual,
        ));
        assert_eq!(result.invoke_kind, InvokeKind::Virtual);
    }

    #[test]
    fn renames_compose_with_kind_overrides() {
        let holder_type = TypeRef::class("I");
        let holder = ProgramClass::builder(holder_type.clone())
            .flags(ClassFlags::PUBLIC | ClassFlags::INTERFACE | ClassFlags::ABSTRACT)
            .build();
        let from = method(&holder_type, "m");
        let to = method(&holder_type, "m$renamed");

        let builder = AccessModifierLens::builder();
        builder.record_move(from.clone(), to.clone());
        // Classification happens against the renamed signature.
        builder.add_publicized_private_virtual_method(&holder, to.clone());
        let lens = builder.build();

        let result = lens
            .describe_lookup_method(MethodLookupResult::identity(from.clone(), InvokeKind::Direct));
        assert_eq!(result.reference, to);
        assert_eq!(result.invoke_kind, InvokeKind::Interface);
        assert_eq!(lens.previous_method_signature(&to), from);
    }

    #[test]
    #[should_panic]
    fn self_moves_are_rejected() {
        let holder_type = TypeRef::class("A");
        let target = method(&holder_type, "m");
        let builder = AccessModifierLens::builder();
        builder.record_move(target.clone(), target);
    }

    #[test]
    #[should_panic]
    fn empty_lens_cannot_be_built() {
        let _ = AccessModifierLens::builder().build();
    }
}
