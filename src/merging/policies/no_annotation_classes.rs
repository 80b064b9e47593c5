//! Veto for annotation classes.

use crate::{graph::ProgramClass, merging::SingleClassPolicy};

/// Keeps annotation classes out of merging.
///
/// Annotations are looked up reflectively by exact type; merging one away
/// would silently change every reflective read of it.
#[derive(Debug, Default)]
pub struct NoAnnotationClasses;

impl SingleClassPolicy for NoAnnotationClasses {
    fn name(&self) -> &'static str {
        "NoAnnotationClasses"
    }

    fn can_merge(&self, class: &ProgramClass) -> bool {
        !class.is_annotation()
    }
}
