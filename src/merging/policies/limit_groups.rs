//! Group-size limiting.

use crate::{
    graph::{ProgramGraph, TypeRef},
    merging::{MergeGroup, MultiClassPolicy},
};

/// Chunks oversized groups down to a fixed maximum size.
///
/// Runs last in the policy list, after all compatibility partitioning. A
/// plain chunking can leave a trailing singleton that merges nothing; the
/// split rebalances by moving one class from the preceding chunk into it,
/// except at the minimum group size of two, where the singleton is simply
/// dropped.
#[derive(Debug)]
pub struct LimitClassGroups {
    max_group_size: usize,
}

impl LimitClassGroups {
    /// Creates the policy with the given cap. Caps below two are senseless.
    pub fn new(max_group_size: usize) -> Self {
        assert!(max_group_size >= 2);
        Self { max_group_size }
    }
}

impl MultiClassPolicy for LimitClassGroups {
    fn name(&self) -> &'static str {
        "LimitClassGroups"
    }

    // Interface groups are already bounded by the collision policy; the cap
    // only applies to ordinary classes.
    fn is_identity_for_interface_groups(&self) -> bool {
        true
    }

    fn apply(&self, group: MergeGroup, _graph: &ProgramGraph) -> Vec<MergeGroup> {
        if group.size() <= self.max_group_size {
            return vec![group];
        }

        let is_interface_group = group.is_interface_group();
        let classes: Vec<TypeRef> = group.into_iter().collect();
        let mut chunks: Vec<MergeGroup> = classes
            .chunks(self.max_group_size)
            .map(|chunk| {
                if is_interface_group {
                    MergeGroup::from_interfaces(chunk.iter().cloned())
                } else {
                    MergeGroup::from_classes(chunk.iter().cloned())
                }
            })
            .collect();

        if chunks.last().is_some_and(MergeGroup::is_trivial) {
            if self.max_group_size == 2 {
                chunks.pop();
            } else if let Some(moved) = {
                let second_last = chunks.len() - 2;
                chunks[second_last].remove_last()
            } {
                let last = chunks.len() - 1;
                chunks[last].add(moved);
            }
        }
        chunks
    }
}
