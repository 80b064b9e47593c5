//! Package-compatibility partitioning.

use std::collections::HashMap;

use crate::{
    graph::{ProgramGraph, TypeRef},
    merging::{MergeGroup, MultiClassPolicy},
};

/// Splits groups so that only classes of the same package merge.
///
/// Merging across packages can turn package-private accesses illegal; keeping
/// groups within one package sidesteps the access analysis entirely. The
/// partition preserves the incoming order, so the first class of each
/// package stays that partition's merge target.
#[derive(Debug, Default)]
pub struct SamePackage;

impl MultiClassPolicy for SamePackage {
    fn name(&self) -> &'static str {
        "SamePackage"
    }

    fn apply(&self, group: MergeGroup, _graph: &ProgramGraph) -> Vec<MergeGroup> {
        let is_interface_group = group.is_interface_group();
        let mut partitions: Vec<MergeGroup> = Vec::new();
        let mut by_package: HashMap<String, usize> = HashMap::new();
        for class in group {
            let package = class.package().to_string();
            let index = *by_package.entry(package).or_insert_with(|| {
                partitions.push(if is_interface_group {
                    MergeGroup::new_interface_group()
                } else {
                    MergeGroup::new()
                });
                partitions.len() - 1
            });
            partitions[index].add(class);
        }
        partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_preserve_insertion_order() {
        let a = TypeRef::class("p.A");
        let b = TypeRef::class("q.B");
        let c = TypeRef::class("p.C");
        let d = TypeRef::class("q.D");
        let group = MergeGroup::from_classes([a.clone(), b.clone(), c.clone(), d.clone()]);

        let partitions = SamePackage.apply(group, &ProgramGraph::new());
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].iter().collect::<Vec<_>>(), vec![&a, &c]);
        assert_eq!(partitions[1].iter().collect::<Vec<_>>(), vec![&b, &d]);
    }

    #[test]
    fn interface_groups_stay_interface_groups() {
        let group =
            MergeGroup::from_interfaces([TypeRef::class("p.I"), TypeRef::class("p.J")]);
        let partitions = SamePackage.apply(group, &ProgramGraph::new());
        assert_eq!(partitions.len(), 1);
        assert!(partitions[0].is_interface_group());
    }
}
