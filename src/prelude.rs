//! Common imports for working with the rewriting core.
//!
//! ```rust
//! use refract::prelude::*;
//! ```

pub use crate::{
    graph::{
        ClassFlags, FieldDefinition, FieldRef, InvokeKind, MemberFlags, MethodDefinition,
        MethodRef, ProgramClass, ProgramGraph, Reference, TypeRef,
    },
    lens::{
        AccessModifierLens, ClassMergerLens, FieldLookupResult, GraphLens, LensChain,
        MemberRebindingLens, MethodLookupResult, RepackagingLens,
    },
    merging::{
        MergeGroup, MergedClasses, MergerOptions, Policy, PolicyExecutor, PolicyStats,
    },
    Error, Result,
};
