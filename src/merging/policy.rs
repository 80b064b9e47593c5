//! Merging policies.
//!
//! Policies are the pluggable legality and shaping rules of the merging
//! pass. They come in three shapes:
//!
//! - **Single-class** policies veto individual classes before any group is
//!   formed.
//! - **Multi-class** policies take one candidate group and split it into
//!   zero or more smaller groups.
//! - **Multi-class with preprocessing** policies additionally compute shared
//!   state over the whole program once, then consult it per group.
//!
//! The preprocessing shape carries an associated data type; [`Policy`] erases
//! it behind [`ErasedPreprocessingPolicy`] so heterogeneous policy lists can
//! run in sequence.
//!
//! # Thread Safety
//!
//! Policies are applied to distinct groups in parallel, so all three traits
//! require `Send + Sync`. [`PolicyStats`] keeps both of its counters behind
//! a single lock: a recorded delta updates class and interface counts as one
//! atomic step.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{
    graph::{ProgramClass, ProgramGraph},
    merging::MergeGroup,
};

/// Vetoes single classes from taking part in any merge.
pub trait SingleClassPolicy: Send + Sync {
    /// Policy name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether `class` may participate in merging at all.
    fn can_merge(&self, class: &ProgramClass) -> bool;
}

/// Splits one candidate group into zero or more valid groups.
pub trait MultiClassPolicy: Send + Sync {
    /// Policy name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Refines `group`. Returned groups keep the target-first ordering;
    /// trivial groups in the output are dropped by the executor.
    fn apply(&self, group: MergeGroup, graph: &ProgramGraph) -> Vec<MergeGroup>;

    /// Whether the policy leaves interface groups untouched by construction.
    /// Identity policies skip the group entirely, so no split or
    /// stats recording happens for them.
    fn is_identity_for_interface_groups(&self) -> bool {
        false
    }
}

/// A multi-class policy with a whole-program precomputation step.
pub trait MultiClassPolicyWithPreprocessing: Send + Sync {
    /// Shared state computed once per policy application.
    type Data: Send + Sync;

    /// Policy name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Computes the shared state over the whole program.
    fn preprocess(&self, graph: &ProgramGraph) -> Self::Data;

    /// Refines `group` consulting the precomputed state.
    fn apply(&self, group: MergeGroup, data: &Self::Data, graph: &ProgramGraph)
        -> Vec<MergeGroup>;

    /// Whether the policy leaves interface groups untouched by construction.
    fn is_identity_for_interface_groups(&self) -> bool {
        false
    }
}

/// Object-safe form of [`MultiClassPolicyWithPreprocessing`].
///
/// The associated data type is erased by running preprocessing and all group
/// applications inside one call.
pub trait ErasedPreprocessingPolicy: Send + Sync {
    /// Policy name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Preprocesses once, then refines every group, recording removals in
    /// `stats`. Trivial output groups are already dropped.
    fn apply_all(
        &self,
        groups: VecDeque<MergeGroup>,
        graph: &ProgramGraph,
        stats: &PolicyStats,
    ) -> VecDeque<MergeGroup>;
}

impl<P: MultiClassPolicyWithPreprocessing> ErasedPreprocessingPolicy for P {
    fn name(&self) -> &'static str {
        MultiClassPolicyWithPreprocessing::name(self)
    }

    fn apply_all(
        &self,
        groups: VecDeque<MergeGroup>,
        graph: &ProgramGraph,
        stats: &PolicyStats,
    ) -> VecDeque<MergeGroup> {
        let data = self.preprocess(graph);
        let mut refined = VecDeque::new();
        for group in groups {
            if group.is_interface_group() && self.is_identity_for_interface_groups() {
                refined.push_back(group);
                continue;
            }
            let previous_size = group.size();
            let is_interface_group = group.is_interface_group();
            let new_groups = self.apply(group, &data, graph);
            stats.record_removed_classes(is_interface_group, previous_size, &new_groups);
            refined.extend(new_groups.into_iter().filter(MergeGroup::is_non_trivial));
        }
        refined
    }
}

/// One policy of any shape, ready to run in a policy list.
pub enum Policy {
    /// A class-level veto.
    SingleClass(Box<dyn SingleClassPolicy>),
    /// A group-splitting rule.
    MultiClass(Box<dyn MultiClassPolicy>),
    /// A group-splitting rule with whole-program preprocessing.
    MultiClassWithPreprocessing(Box<dyn ErasedPreprocessingPolicy>),
}

impl Policy {
    /// Wraps a single-class policy.
    pub fn single_class(policy: impl SingleClassPolicy + 'static) -> Self {
        Policy::SingleClass(Box::new(policy))
    }

    /// Wraps a multi-class policy.
    pub fn multi_class(policy: impl MultiClassPolicy + 'static) -> Self {
        Policy::MultiClass(Box::new(policy))
    }

    /// Wraps a preprocessing policy, erasing its data type.
    pub fn multi_class_with_preprocessing(
        policy: impl MultiClassPolicyWithPreprocessing + 'static,
    ) -> Self {
        Policy::MultiClassWithPreprocessing(Box::new(policy))
    }

    /// The wrapped policy's name.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::SingleClass(policy) => policy.name(),
            Policy::MultiClass(policy) => policy.name(),
            Policy::MultiClassWithPreprocessing(policy) => policy.name(),
        }
    }
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Policy").field(&self.name()).finish()
    }
}

#[derive(Debug, Default)]
struct RemovalCounters {
    removed_classes: usize,
    removed_interfaces: usize,
}

/// Pass-scoped accounting of how many planned removals policies undo.
///
/// Every non-trivial group of size `n` stands to remove `n - 1` classes.
/// When a policy splits a group, some of those removals no longer happen;
/// the recorded delta is `(previous_size - 1)` minus the sum of `size - 1`
/// over the non-trivial result groups.
#[derive(Debug, Default)]
pub struct PolicyStats {
    counters: Mutex<RemovalCounters>,
}

impl PolicyStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the removal delta of refining one group of `previous_size`
    /// classes into `new_groups`.
    pub fn record_removed_classes(
        &self,
        is_interface_group: bool,
        previous_size: usize,
        new_groups: &[MergeGroup],
    ) {
        assert!(previous_size >= 2);
        let remaining: usize = new_groups
            .iter()
            .filter(|group| group.is_non_trivial())
            .map(|group| group.size() - 1)
            .sum();
        let delta = (previous_size - 1).saturating_sub(remaining);
        let mut counters = self.counters.lock().unwrap();
        if is_interface_group {
            counters.removed_interfaces += delta;
        } else {
            counters.removed_classes += delta;
        }
    }

    /// Folds another accumulator into this one.
    pub fn absorb(&self, other: PolicyStats) {
        let other = other.counters.into_inner().unwrap();
        let mut counters = self.counters.lock().unwrap();
        counters.removed_classes += other.removed_classes;
        counters.removed_interfaces += other.removed_interfaces;
    }

    /// Ordinary classes policies excluded from merging.
    pub fn removed_classes(&self) -> usize {
        self.counters.lock().unwrap().removed_classes
    }

    /// Interfaces policies excluded from merging.
    pub fn removed_interfaces(&self) -> usize {
        self.counters.lock().unwrap().removed_interfaces
    }
}

/// Drops groups that no longer describe an actual merge.
pub fn remove_trivial_groups(groups: &mut VecDeque<MergeGroup>) {
    groups.retain(MergeGroup::is_non_trivial);
}
