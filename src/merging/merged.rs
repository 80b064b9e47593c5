//! Registry of finalized merge decisions.
//!
//! [`MergedClasses`] answers, for the whole merging pass, which classes were
//! merged away and where each one went. It is built once from the final
//! groups and queried by the lens construction and by later passes that must
//! not see pruned classes again.

use crate::{
    collections::BidirectionalManyToOneMap,
    graph::{ProgramGraph, TypeRef},
    merging::MergeGroup,
};

/// Immutable source → target mapping for every merged class.
#[derive(Debug, Default)]
pub struct MergedClasses {
    merges: BidirectionalManyToOneMap<TypeRef, TypeRef>,
}

impl MergedClasses {
    /// Starts building the registry.
    pub fn builder() -> MergedClassesBuilder {
        MergedClassesBuilder::default()
    }

    /// The registry of a pass that merged nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether nothing was merged.
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Whether `type_ref` was merged into another class.
    pub fn is_merge_source(&self, type_ref: &TypeRef) -> bool {
        self.merges.contains_key(type_ref)
    }

    /// Whether other classes were merged into `type_ref`.
    pub fn is_merge_target(&self, type_ref: &TypeRef) -> bool {
        self.merges.contains_value(type_ref)
    }

    /// Whether `type_ref` participated in any merge, on either side.
    pub fn is_merge_source_or_target(&self, type_ref: &TypeRef) -> bool {
        self.is_merge_source(type_ref) || self.is_merge_target(type_ref)
    }

    /// The merge target of `type_ref`, when it was merged away.
    pub fn get_merge_target(&self, type_ref: &TypeRef) -> Option<&TypeRef> {
        self.merges.get(type_ref)
    }

    /// The merge target of `type_ref`, or `default` when it was not merged.
    pub fn get_merge_target_or_default(&self, type_ref: &TypeRef, default: TypeRef) -> TypeRef {
        self.merges.get(type_ref).cloned().unwrap_or(default)
    }

    /// All sources merged into `target`, in recording order.
    pub fn get_sources_for(&self, target: &TypeRef) -> &[TypeRef] {
        self.merges.get_keys(target)
    }

    /// Number of classes merged away.
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Iterates `(sources, target)` pairs, unordered across targets.
    pub fn merge_groups(&self) -> impl Iterator<Item = (&[TypeRef], &TypeRef)> {
        self.merges.many_to_one_iter()
    }

    /// Visits every `(sources, target)` pair.
    pub fn for_each_merge_group(&self, consumer: impl FnMut(&[TypeRef], &TypeRef)) {
        self.merges.for_each_many_to_one(consumer);
    }

    /// Checks that no merge source is still present in the program graph.
    ///
    /// Sources must be pruned before the next pass runs; a surviving source
    /// would be resolvable under a stale identity.
    pub fn verify_all_sources_pruned(&self, graph: &ProgramGraph) -> bool {
        self.merges.iter().all(|(source, _)| !graph.contains(source))
    }
}

/// Builder for [`MergedClasses`].
#[derive(Debug, Default)]
pub struct MergedClassesBuilder {
    merges: BidirectionalManyToOneMap<TypeRef, TypeRef>,
}

impl MergedClassesBuilder {
    /// Records a finalized group: every source maps to the group target.
    ///
    /// Trivial groups carry no merge and must not reach the builder.
    pub fn add_merge_group(&mut self, group: &MergeGroup) {
        debug_assert!(group.is_non_trivial());
        if let Some(target) = group.target() {
            let target = target.clone();
            for source in group.sources() {
                self.merges.put(source.clone(), target.clone());
            }
        }
    }

    /// Freezes the builder into the immutable registry.
    #[must_use]
    pub fn build(self) -> MergedClasses {
        MergedClasses {
            merges: self.merges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_distinguish_sources_and_targets() {
        let a = TypeRef::class("A");
        let b = TypeRef::class("B");
        let c = TypeRef::class("C");
        let d = TypeRef::class("D");

        let mut builder = MergedClasses::builder();
        builder.add_merge_group(&MergeGroup::from_classes([a.clone(), b.clone(), c.clone()]));
        let merged = builder.build();

        assert!(merged.is_merge_target(&a));
        assert!(!merged.is_merge_source(&a));
        assert!(merged.is_merge_source(&b));
        assert!(merged.is_merge_source_or_target(&c));
        assert!(!merged.is_merge_source_or_target(&d));

        assert_eq!(merged.get_merge_target(&b), Some(&a));
        assert_eq!(merged.get_merge_target_or_default(&d, d.clone()), d);
        assert_eq!(merged.get_sources_for(&a), &[b, c]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn pruning_verification_flags_surviving_sources() {
        use crate::graph::ProgramClass;

        let a = TypeRef::class("A");
        let b = TypeRef::class("B");
        let mut builder = MergedClasses::builder();
        builder.add_merge_group(&MergeGroup::from_classes([a.clone(), b.clone()]));
        let merged = builder.build();

        let mut graph = ProgramGraph::new();
        graph.add_class(ProgramClass::builder(a).build()).unwrap();
        assert!(merged.verify_all_sources_pruned(&graph));

        graph.add_class(ProgramClass::builder(b).build()).unwrap();
        assert!(!merged.verify_all_sources_pruned(&graph));
    }
}
