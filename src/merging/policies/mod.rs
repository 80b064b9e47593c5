//! Built-in merging policies.
//!
//! The stock policy list a merging pass runs, in the order they are meant to
//! run: class-level vetoes first, then group partitioning by compatibility,
//! then the size limiter last so no earlier policy has to reason about
//! oversized groups.

mod limit_groups;
mod no_annotation_classes;
mod no_default_method_collisions;
mod same_package;

pub use limit_groups::LimitClassGroups;
pub use no_annotation_classes::NoAnnotationClasses;
pub use no_default_method_collisions::NoDefaultMethodCollisions;
pub use same_package::SamePackage;

use crate::merging::{MergerOptions, Policy};

/// The default policy list for a merging pass.
pub fn default_policies(options: &MergerOptions) -> Vec<Policy> {
    vec![
        Policy::single_class(NoAnnotationClasses),
        Policy::multi_class(SamePackage),
        Policy::multi_class_with_preprocessing(NoDefaultMethodCollisions),
        Policy::multi_class(LimitClassGroups::new(options.max_group_size)),
    ]
}
