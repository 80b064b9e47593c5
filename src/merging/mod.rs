//! Policy-driven class merging.
//!
//! Merging collapses groups of compatible classes into single classes to
//! shrink the program. The pass is structured as a pipeline:
//!
//! 1. [`PolicyExecutor::initial_groups`] seeds one group of all mergeable
//!    classes and one of all mergeable interfaces.
//! 2. [`PolicyExecutor::run`] drives a [`Policy`] list over the groups;
//!    every policy either vetoes classes or splits groups, and groups that
//!    no longer merge anything are dropped after each step.
//! 3. The surviving groups are committed into [`MergedClasses`], the
//!    immutable source → target registry.
//! 4. [`crate::lens::ClassMergerLens::from_merged`] turns the registry into
//!    the lens the rest of the compilation consults.
//!
//! # Key Components
//!
//! - [`MergeGroup`] — one ordered candidate group, target first
//! - [`Policy`] and the three policy traits — legality and shaping rules
//! - [`PolicyExecutor`] — the ordered pipeline with removal accounting
//! - [`MergedClasses`] — the committed outcome
//! - [`policies`] — the stock policy implementations
//!
//! # Thread Safety
//!
//! Policies run in sequence; within one policy, groups are refined in
//! parallel. [`PolicyStats`] is the only shared mutable state and keeps both
//! counters behind one lock.

mod executor;
mod group;
mod merged;
mod options;
pub mod policies;
mod policy;

pub use executor::PolicyExecutor;
pub use group::MergeGroup;
pub use merged::{MergedClasses, MergedClassesBuilder};
pub use options::MergerOptions;
pub use policy::{
    remove_trivial_groups, ErasedPreprocessingPolicy, MultiClassPolicy,
    MultiClassPolicyWithPreprocessing, Policy, PolicyStats, SingleClassPolicy,
};

use std::collections::VecDeque;

use crate::{
    graph::ProgramGraph,
    lens::ClassMergerLens,
    Result,
};

/// Runs a full merging pass: seed groups, apply the policy list, commit the
/// survivors, and build the lens describing the merge.
///
/// # Errors
///
/// Returns [`crate::Error::UnknownClass`] when a committed group names a
/// type the program graph does not contain.
pub fn run_class_merging(
    graph: &ProgramGraph,
    options: &MergerOptions,
    policy_list: &[Policy],
) -> Result<(MergedClasses, ClassMergerLens, PolicyStats)> {
    let executor = PolicyExecutor::new();
    let seeds = executor.initial_groups(graph, options);
    let (groups, stats) = executor.run(graph, seeds, policy_list);
    let merged = commit_groups(groups);
    let lens = ClassMergerLens::from_merged(&merged, graph)?;
    Ok((merged, lens, stats))
}

/// Freezes final groups into the [`MergedClasses`] registry.
pub fn commit_groups(groups: VecDeque<MergeGroup>) -> MergedClasses {
    let mut builder = MergedClasses::builder();
    for group in &groups {
        builder.add_merge_group(group);
    }
    builder.build()
}
