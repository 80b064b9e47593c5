//! Policy executor.
//!
//! Drives a policy list over the candidate groups: policies run strictly in
//! sequence (each sees the groups the previous one produced), while within a
//! multi-class policy the groups are refined in parallel. After every policy
//! the trivial groups are dropped, so no policy ever sees a group that
//! cannot merge anything.

use std::collections::VecDeque;

use rayon::prelude::*;

use crate::{
    graph::{ProgramGraph, TypeRef},
    merging::{
        remove_trivial_groups, MergeGroup, MergerOptions, Policy, PolicyStats, SingleClassPolicy,
    },
};

/// Runs policy lists over merge-group candidates.
#[derive(Debug, Default)]
pub struct PolicyExecutor;

impl PolicyExecutor {
    /// Creates an executor.
    pub fn new() -> Self {
        Self
    }

    /// Seeds the initial candidate groups from the program: one group of all
    /// mergeable classes and, when enabled, one group of all mergeable
    /// interfaces, in program order. Trivial seeds are dropped immediately.
    pub fn initial_groups(
        &self,
        graph: &ProgramGraph,
        options: &MergerOptions,
    ) -> VecDeque<MergeGroup> {
        let mut class_group = MergeGroup::new();
        let mut interface_group = MergeGroup::new_interface_group();
        for class in graph.classes() {
            if class.is_interface() {
                if options.enable_interface_merging {
                    interface_group.add(class.reference().clone());
                }
            } else {
                class_group.add(class.reference().clone());
            }
        }

        let mut groups = VecDeque::new();
        groups.push_back(class_group);
        groups.push_back(interface_group);
        remove_trivial_groups(&mut groups);
        groups
    }

    /// Runs `policies` in order over `groups`, returning the surviving
    /// groups and the removal accounting for the whole run.
    pub fn run(
        &self,
        graph: &ProgramGraph,
        mut groups: VecDeque<MergeGroup>,
        policies: &[Policy],
    ) -> (VecDeque<MergeGroup>, PolicyStats) {
        let stats = PolicyStats::new();
        for policy in policies {
            groups = match policy {
                Policy::SingleClass(policy) => {
                    self.apply_single_class_policy(graph, groups, policy.as_ref(), &stats)
                }
                Policy::MultiClass(policy) => {
                    let refined: Vec<Vec<MergeGroup>> = groups
                        .into_par_iter()
                        .map(|group| {
                            if group.is_interface_group()
                                && policy.is_identity_for_interface_groups()
                            {
                                return vec![group];
                            }
                            let previous_size = group.size();
                            let is_interface_group = group.is_interface_group();
                            let new_groups = policy.apply(group, graph);
                            stats.record_removed_classes(
                                is_interface_group,
                                previous_size,
                                &new_groups,
                            );
                            new_groups
                        })
                        .collect();
                    refined.into_iter().flatten().collect()
                }
                Policy::MultiClassWithPreprocessing(policy) => {
                    policy.apply_all(groups, graph, &stats)
                }
            };
            remove_trivial_groups(&mut groups);
        }
        (groups, stats)
    }

    /// Filters vetoed classes out of every group, keeping the order of the
    /// survivors. A veto can dissolve a group entirely.
    fn apply_single_class_policy(
        &self,
        graph: &ProgramGraph,
        groups: VecDeque<MergeGroup>,
        policy: &dyn SingleClassPolicy,
        stats: &PolicyStats,
    ) -> VecDeque<MergeGroup> {
        groups
            .into_par_iter()
            .map(|group| {
                let previous_size = group.size();
                let is_interface_group = group.is_interface_group();
                let survivors: Vec<TypeRef> = group
                    .into_iter()
                    .filter(|type_ref| {
                        graph.class(type_ref).is_some_and(|class| policy.can_merge(class))
                    })
                    .collect();
                let refined = if is_interface_group {
                    MergeGroup::from_interfaces(survivors)
                } else {
                    MergeGroup::from_classes(survivors)
                };
                stats.record_removed_classes(
                    is_interface_group,
                    previous_size,
                    std::slice::from_ref(&refined),
                );
                refined
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ClassFlags, ProgramClass};

    struct KeepAll;

    impl SingleClassPolicy for KeepAll {
        fn name(&self) -> &'static str {
            "KeepAll"
        }

        fn can_merge(&self, _class: &ProgramClass) -> bool {
            true
        }
    }

    fn graph_of(classes: &[(&str, bool)]) -> ProgramGraph {
        let mut graph = ProgramGraph::new();
        for (name, is_interface) in classes {
            let mut builder = ProgramClass::builder(TypeRef::class(name));
            if *is_interface {
                builder = builder.flags(ClassFlags::INTERFACE | ClassFlags::ABSTRACT);
            }
            graph.add_class(builder.build()).unwrap();
        }
        graph
    }

    #[test]
    fn initial_groups_split_classes_and_interfaces() {
        let graph = graph_of(&[("A", false), ("I", true), ("B", false), ("J", true)]);
        let executor = PolicyExecutor::new();
        let groups = executor.initial_groups(&graph, &MergerOptions::default());

        assert_eq!(groups.len(), 2);
        assert!(!groups[0].is_interface_group());
        assert_eq!(
            groups[0].iter().collect::<Vec<_>>(),
            vec![&TypeRef::class("A"), &TypeRef::class("B")]
        );
        assert!(groups[1].is_interface_group());
        assert_eq!(groups[1].size(), 2);
    }

    #[test]
    fn disabled_interface_merging_drops_the_interface_seed() {
        let graph = graph_of(&[("A", false), ("B", false), ("I", true), ("J", true)]);
        let executor = PolicyExecutor::new();
        let options = MergerOptions::default().without_interface_merging();
        let groups = executor.initial_groups(&graph, &options);

        assert_eq!(groups.len(), 1);
        assert!(!groups[0].is_interface_group());
    }

    #[test]
    fn single_class_vetoes_shrink_groups_and_count_removals() {
        struct RejectName(&'static str);

        impl SingleClassPolicy for RejectName {
            fn name(&self) -> &'static str {
                "RejectName"
            }

            fn can_merge(&self, class: &ProgramClass) -> bool {
                class.reference().internal_name() != self.0
            }
        }

        let graph = graph_of(&[("A", false), ("B", false), ("C", false)]);
        let executor = PolicyExecutor::new();
        let seeds = executor.initial_groups(&graph, &MergerOptions::default());
        let policies = [Policy::single_class(RejectName("B"))];
        let (groups, stats) = executor.run(&graph, seeds, &policies);

        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].iter().collect::<Vec<_>>(),
            vec![&TypeRef::class("A"), &TypeRef::class("C")]
        );
        // Three classes planned two removals; two survivors plan one.
        assert_eq!(stats.removed_classes(), 1);
    }

    #[test]
    fn a_policy_sees_what_the_previous_policy_produced() {
        struct SplitInPairs;

        impl crate::merging::MultiClassPolicy for SplitInPairs {
            fn name(&self) -> &'static str {
                "SplitInPairs"
            }

            fn apply(&self, group: MergeGroup, _graph: &ProgramGraph) -> Vec<MergeGroup> {
                let classes: Vec<TypeRef> = group.into_iter().collect();
                classes
                    .chunks(2)
                    .map(|chunk| MergeGroup::from_classes(chunk.iter().cloned()))
                    .collect()
            }
        }

        let graph = graph_of(&[("A", false), ("B", false), ("C", false), ("D", false)]);
        let executor = PolicyExecutor::new();
        let seeds = executor.initial_groups(&graph, &MergerOptions::default());
        let policies = [
            Policy::multi_class(SplitInPairs),
            Policy::single_class(KeepAll),
        ];
        let (groups, stats) = executor.run(&graph, seeds, &policies);

        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|group| group.size() == 2));
        // Four classes planned three removals; two pairs keep two of them.
        assert_eq!(stats.removed_classes(), 1);
    }
}
