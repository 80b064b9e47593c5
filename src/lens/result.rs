//! Lookup result types for member lens lookups.
//!
//! A lookup answers two questions at once: what the reference has been
//! rewritten to ([`reference`](MethodLookupResult::reference)), and which
//! declaration it is bound against after rebinding
//! ([`rebound_reference`](MethodLookupResult::rebound_reference)). Method
//! lookups additionally carry the invoke kind, which lenses may change along
//! the way.

use crate::graph::{FieldRef, InvokeKind, MethodRef};

/// Result of looking up a field reference through a lens chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLookupResult {
    /// The rewritten reference, as it must appear in code.
    pub reference: FieldRef,
    /// The rewritten reference, bound to the class that declares the field.
    pub rebound_reference: FieldRef,
}

impl FieldLookupResult {
    /// A result where nothing has been rewritten yet.
    pub fn identity(reference: FieldRef) -> Self {
        Self {
            rebound_reference: reference.clone(),
            reference,
        }
    }
}

/// Result of looking up a method reference through a lens chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodLookupResult {
    /// The rewritten reference, as it must appear in code.
    pub reference: MethodRef,
    /// The rewritten reference, bound to the class that declares the method.
    pub rebound_reference: MethodRef,
    /// The invoke kind valid against the rewritten reference.
    pub invoke_kind: InvokeKind,
}

impl MethodLookupResult {
    /// A result where nothing has been rewritten yet.
    pub fn identity(reference: MethodRef, invoke_kind: InvokeKind) -> Self {
        Self {
            rebound_reference: reference.clone(),
            reference,
            invoke_kind,
        }
    }
}
