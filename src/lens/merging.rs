//! Class-merger lens.
//!
//! Records the outcome of a class-merging pass: every merge source type now
//! means its merge target, members declared on sources moved onto the target,
//! and signatures mentioning a source type rewrite through the type map.
//!
//! Merging can change how a call dispatches. When an interface is merged into
//! a class, invokes that used to go through the interface must become virtual
//! invokes against the target — the decision is made against the holder as
//! rewritten by this lens, never the original holder.

use std::collections::HashSet;
use std::sync::Mutex;

use crossbeam_skiplist::SkipSet;

use crate::{
    collections::BidirectionalManyToOneMap,
    graph::{FieldRef, InvokeKind, MethodRef, ProgramGraph, TypeRef},
    lens::{rewrite_field_types, rewrite_method_types, FieldLookupResult, MethodLookupResult},
    merging::MergedClasses,
    Error, Result,
};

/// Immutable lens over one class-merging pass.
#[derive(Debug)]
pub struct ClassMergerLens {
    type_map: BidirectionalManyToOneMap<TypeRef, TypeRef>,
    method_map: BidirectionalManyToOneMap<MethodRef, MethodRef>,
    field_map: BidirectionalManyToOneMap<FieldRef, FieldRef>,

    // Merge targets that are interfaces. Consulted when deciding whether a
    // moved method is now dispatched as interface or virtual.
    interface_targets: HashSet<TypeRef>,
}

impl ClassMergerLens {
    /// Starts building a class-merger lens.
    pub fn builder() -> ClassMergerLensBuilder {
        ClassMergerLensBuilder::default()
    }

    /// Builds the lens for finalized merge decisions.
    ///
    /// Declared members of every merge source get explicit moves onto the
    /// target so the reverse walk can recover original signatures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClass`] when a merge group names a type the
    /// program graph does not contain.
    pub fn from_merged(merged: &MergedClasses, graph: &ProgramGraph) -> Result<Self> {
        let builder = Self::builder();
        for (sources, target) in merged.merge_groups() {
            if !graph.contains(target) {
                return Err(Error::UnknownClass(target.clone()));
            }
            builder.record_type_merge(sources.iter().cloned(), target.clone(), graph.is_interface(target));
            for source in sources {
                let class = graph
                    .class(source)
                    .ok_or_else(|| Error::UnknownClass(source.clone()))?;
                let map_type = |type_ref: &TypeRef| {
                    merged
                        .get_merge_target_or_default(type_ref, type_ref.clone())
                };
                for method in class.methods() {
                    let to = rewrite_method_types(method.reference(), &map_type);
                    builder.record_method_move(method.reference().clone(), to);
                }
                for field in class.fields() {
                    let to = rewrite_field_types(field.reference(), &map_type);
                    builder.record_field_move(field.reference().clone(), to);
                }
            }
        }
        Ok(builder.build())
    }

    /// The merge target of `type_ref`, or `type_ref` itself.
    pub fn next_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        self.type_map.get(type_ref).cloned().unwrap_or_else(|| type_ref.clone())
    }

    /// Merging has no unique inverse on types; the reverse walk leaves types
    /// unchanged.
    pub fn previous_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        type_ref.clone()
    }

    /// The moved method signature, or the signature types rewritten through
    /// the type map when no explicit move was recorded.
    pub fn next_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.method_map.get(method).cloned().unwrap_or_else(|| {
            rewrite_method_types(method, &|type_ref| self.next_class_type(type_ref))
        })
    }

    /// The original signature of a moved method, when it is unambiguous.
    ///
    /// A merged method with several original signatures has no unique
    /// previous signature; the reference is then returned unchanged.
    pub fn previous_method_signature(&self, method: &MethodRef) -> MethodRef {
        match self.method_map.get_keys(method) {
            [original] => original.clone(),
            _ => method.clone(),
        }
    }

    /// The moved field signature, analogous to
    /// [`ClassMergerLens::next_method_signature`].
    pub fn next_field_signature(&self, field: &FieldRef) -> FieldRef {
        self.field_map.get(field).cloned().unwrap_or_else(|| {
            rewrite_field_types(field, &|type_ref| self.next_class_type(type_ref))
        })
    }

    /// The original signature of a moved field, when it is unambiguous.
    pub fn previous_field_signature(&self, field: &FieldRef) -> FieldRef {
        match self.field_map.get_keys(field) {
            [original] => original.clone(),
            _ => field.clone(),
        }
    }

    pub(crate) fn describe_lookup_field(&self, previous: FieldLookupResult) -> FieldLookupResult {
        let reference = self.next_field_signature(&previous.reference);
        let rebound_reference = self.next_field_signature(&previous.rebound_reference);
        if reference != previous.reference || rebound_reference != previous.rebound_reference {
            FieldLookupResult {
                reference,
                rebound_reference,
            }
        } else {
            previous
        }
    }

    pub(crate) fn describe_lookup_method(&self, previous: MethodLookupResult) -> MethodLookupResult {
        let reference = self.next_method_signature(&previous.reference);
        let rebound_reference = self.next_method_signature(&previous.rebound_reference);

        let mut invoke_kind = previous.invoke_kind;
        if rebound_reference.holder() != previous.rebound_reference.holder() {
            // The holder was merged away; dispatch follows the kind of the
            // rewritten holder, not the kind the original holder had.
            let target_is_interface = self.interface_targets.contains(rebound_reference.holder());
            invoke_kind = match invoke_kind {
                InvokeKind::Interface if !target_is_interface => InvokeKind::Virtual,
                InvokeKind::Virtual if target_is_interface => InvokeKind::Interface,
                other => other,
            };
        }

        if reference != previous.reference
            || rebound_reference != previous.rebound_reference
            || invoke_kind != previous.invoke_kind
        {
            MethodLookupResult {
                reference,
                rebound_reference,
                invoke_kind,
            }
        } else {
            previous
        }
    }
}

/// Builder for [`ClassMergerLens`], safe for concurrent recording.
#[derive(Default)]
pub struct ClassMergerLensBuilder {
    type_map: Mutex<BidirectionalManyToOneMap<TypeRef, TypeRef>>,
    method_map: Mutex<BidirectionalManyToOneMap<MethodRef, MethodRef>>,
    field_map: Mutex<BidirectionalManyToOneMap<FieldRef, FieldRef>>,
    interface_targets: SkipSet<TypeRef>,
}

impl ClassMergerLensBuilder {
    /// Records that `sources` merge into `target`.
    pub fn record_type_merge<I: IntoIterator<Item = TypeRef>>(
        &self,
        sources: I,
        target: TypeRef,
        target_is_interface: bool,
    ) {
        if target_is_interface {
            self.interface_targets.insert(target.clone());
        }
        self.type_map.lock().unwrap().put_all(sources, target);
    }

    /// Records a member move onto the merge target. Self-moves are skipped;
    /// a source member whose signature survives unchanged needs no entry.
    pub fn record_method_move(&self, from: MethodRef, to: MethodRef) {
        if from != to {
            self.method_map.lock().unwrap().put(from, to);
        }
    }

    /// Field companion of [`ClassMergerLensBuilder::record_method_move`].
    pub fn record_field_move(&self, from: FieldRef, to: FieldRef) {
        if from != to {
            self.field_map.lock().unwrap().put(from, to);
        }
    }

    /// Freezes the builder into an immutable lens.
    #[must_use]
    pub fn build(self) -> ClassMergerLens {
        ClassMergerLens {
            type_map: self.type_map.into_inner().unwrap(),
            method_map: self.method_map.into_inner().unwrap(),
            field_map: self.field_map.into_inner().unwrap(),
            interface_targets: self
                .interface_targets
                .iter()
                .map(|entry| entry.value().clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(holder: &TypeRef, name: &str) -> MethodRef {
        MethodRef::new(
            holder.clone(),
            name,
            TypeRef::from_descriptor("V").unwrap(),
            Vec::new(),
        )
    }

    #[test]
    fn merged_types_rewrite_members_and_arrays() {
        let source = TypeRef::class("A");
        let target = TypeRef::class("B");
        let builder = ClassMergerLens::builder();
        builder.record_type_merge([source.clone()], target.clone(), false);
        let lens = builder.build();

        assert_eq!(lens.next_class_type(&source), target);

        let rewritten = lens.next_method_signature(&method(&source, "m"));
        assert_eq!(rewritten.holder(), &target);

        let field = FieldRef::new(source.clone(), "f", source.array_of());
        let rewritten = lens.next_field_signature(&field);
        assert_eq!(rewritten.holder(), &target);
        assert_eq!(rewritten.field_type(), &target.array_of());
    }

    #[test]
    fn interface_invoke_becomes_virtual_when_merged_into_class() {
        let source = TypeRef::class("I");
        let target = TypeRef::class("J");
        let builder = ClassMergerLens::builder();
        builder.record_type_merge([source.clone()], target.clone(), false);
        let from = method(&source, "m");
        let to = method(&target, "m");
        builder.record_method_move(from.clone(), to.clone());
        let lens = builder.build();

        let result = lens.describe_lookup_method(MethodLookupResult::identity(
            from,
            InvokeKind::Interface,
        ));
        assert_eq!(result.reference, to);
        assert_eq!(result.invoke_kind, InvokeKind::Virtual);
    }

    #[test]
    fn previous_signature_recovers_unambiguous_moves() {
        let source = TypeRef::class("A");
        let target = TypeRef::class("B");
        let builder = ClassMergerLens::builder();
        builder.record_type_merge([source.clone()], target.clone(), false);
        let from = method(&source, "m");
        let to = method(&target, "m$merged");
        builder.record_method_move(from.clone(), to.clone());

        // Two originals collapsing onto one target have no unique previous
        // signature.
        let other_source = TypeRef::class("C");
        let ambiguous_from = method(&other_source, "n");
        let ambiguous_to = method(&target, "n$merged");
        builder.record_method_move(ambiguous_from, ambiguous_to.clone());
        builder.record_method_move(method(&source, "n"), ambiguous_to.clone());
        let lens = builder.build();

        assert_eq!(lens.previous_method_signature(&to), from);
        assert_eq!(lens.previous_method_signature(&ambiguous_to), ambiguous_to);
    }
}
