//! The abstract program graph the rewriting core operates over.
//!
//! Front-end parsing is an external collaborator: this module only models
//! what the core needs — immutable reference identities
//! ([`TypeRef`]/[`FieldRef`]/[`MethodRef`]), the closed class set
//! ([`ProgramGraph`]) with member resolution, and the referenced-members
//! sweep that seeds member rebinding.

mod classes;
mod collector;
mod reference;

pub use classes::{
    ClassFlags, FieldDefinition, MemberFlags, MethodDefinition, ProgramClass,
    ProgramClassBuilder, ProgramGraph,
};
pub use collector::{ReferencedMembersCollector, ReferencedMembersConsumer};
pub use reference::{FieldRef, InvokeKind, MethodRef, Reference, TypeRef};
