//! Graph lenses: composable views over the program's reference space.
//!
//! Every whole-program pass that changes reference identity — access
//! widening, repackaging, member rebinding, class merging — publishes an
//! immutable lens describing its rewrites. Lenses compose into a
//! [`LensChain`]: given a reference as it existed at an earlier compilation
//! stage, the chain produces the reference valid now (and the reverse walk
//! recovers the original).
//!
//! # Architecture
//!
//! The chain is an explicit ordered list in construction order (oldest
//! first): forward lookups fold the list front to back, which is exactly the
//! order the rewrites happened in; reverse walks fold back to front. The
//! identity lens is the empty chain, so identity totality holds for any
//! depth.
//!
//! # Failure Semantics
//!
//! Lookups are total. A reference no lens knows about resolves to itself —
//! absence of a mapping means identity, never an error.
//!
//! # Thread Safety
//!
//! Built lenses and chains are immutable; lookups take `&self` and are safe
//! for unsynchronized concurrent reads. All mutation happens in the paired
//! builders before `build`.

mod access;
mod merging;
mod rebinding;
mod repackaging;
mod result;

pub use access::{AccessModifierLens, AccessModifierLensBuilder};
pub use merging::{ClassMergerLens, ClassMergerLensBuilder};
pub use rebinding::{MemberRebindingLens, MemberRebindingLensBuilder};
pub use repackaging::{RepackagingLens, RepackagingLensBuilder};
pub use result::{FieldLookupResult, MethodLookupResult};

use crate::graph::{FieldRef, InvokeKind, MethodRef, Reference, TypeRef};

/// Rewrites a type through a class-type mapping, handling arrays and
/// primitives: arrays follow their base type, primitives are fixpoints.
pub(crate) fn rewrite_type(type_ref: &TypeRef, map_class: &impl Fn(&TypeRef) -> TypeRef) -> TypeRef {
    if type_ref.is_class_type() {
        return map_class(type_ref);
    }
    if type_ref.is_array_type() {
        let base = type_ref.base_type();
        if base.is_class_type() {
            let new_base = map_class(&base);
            if new_base != base {
                return type_ref.replace_base_type(&new_base);
            }
        }
    }
    type_ref.clone()
}

/// Rewrites every type in a field signature through a class-type mapping.
pub(crate) fn rewrite_field_types(
    field: &FieldRef,
    map_class: &impl Fn(&TypeRef) -> TypeRef,
) -> FieldRef {
    FieldRef::new(
        rewrite_type(field.holder(), map_class),
        field.name(),
        rewrite_type(field.field_type(), map_class),
    )
}

/// Rewrites every type in a method signature through a class-type mapping.
pub(crate) fn rewrite_method_types(
    method: &MethodRef,
    map_class: &impl Fn(&TypeRef) -> TypeRef,
) -> MethodRef {
    MethodRef::new(
        rewrite_type(method.holder(), map_class),
        method.name(),
        rewrite_type(method.return_type(), map_class),
        method
            .parameters()
            .iter()
            .map(|parameter| rewrite_type(parameter, map_class))
            .collect(),
    )
}

/// One transformation stage's view over the reference space.
///
/// A closed union: lookup dispatch is exhaustive and compiler checked. The
/// identity lens is not a variant — it is the empty [`LensChain`] — and
/// composition is the chain itself.
#[derive(Debug)]
pub enum GraphLens {
    /// Method visibility changes (private → virtual/interface).
    AccessModifier(AccessModifierLens),
    /// Type and package renames.
    Repackaging(RepackagingLens),
    /// Member references resolved to their declaring classes.
    MemberRebinding(MemberRebindingLens),
    /// Classes merged away into targets.
    ClassMerger(ClassMergerLens),
}

impl GraphLens {
    /// Whether this lens stems from a repackaging pass.
    pub fn is_repackaging_lens(&self) -> bool {
        matches!(self, GraphLens::Repackaging(_))
    }

    fn next_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        match self {
            GraphLens::AccessModifier(_) | GraphLens::MemberRebinding(_) => type_ref.clone(),
            GraphLens::Repackaging(lens) => lens.next_class_type(type_ref),
            GraphLens::ClassMerger(lens) => lens.next_class_type(type_ref),
        }
    }

    fn previous_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        match self {
            GraphLens::AccessModifier(_) | GraphLens::MemberRebinding(_) => type_ref.clone(),
            GraphLens::Repackaging(lens) => lens.previous_class_type(type_ref),
            GraphLens::ClassMerger(lens) => lens.previous_class_type(type_ref),
        }
    }

    fn next_field_signature(&self, field: &FieldRef) -> FieldRef {
        match self {
            GraphLens::AccessModifier(_) | GraphLens::MemberRebinding(_) => field.clone(),
            GraphLens::Repackaging(lens) => lens.next_field_signature(field),
            GraphLens::ClassMerger(lens) => lens.next_field_signature(field),
        }
    }

    fn previous_field_signature(&self, field: &FieldRef) -> FieldRef {
        match self {
            GraphLens::AccessModifier(_) | GraphLens::MemberRebinding(_) => field.clone(),
            GraphLens::Repackaging(lens) => lens.previous_field_signature(field),
            GraphLens::ClassMerger(lens) => lens.previous_field_signature(field),
        }
    }

    fn next_method_signature(&self, method: &MethodRef) -> MethodRef {
        match self {
            GraphLens::AccessModifier(lens) => lens.next_method_signature(method),
            GraphLens::MemberRebinding(_) => method.clone(),
            GraphLens::Repackaging(lens) => lens.next_method_signature(method),
            GraphLens::ClassMerger(lens) => lens.next_method_signature(method),
        }
    }

    fn previous_method_signature(&self, method: &MethodRef) -> MethodRef {
        match self {
            GraphLens::AccessModifier(lens) => lens.previous_method_signature(method),
            GraphLens::MemberRebinding(_) => method.clone(),
            GraphLens::Repackaging(lens) => lens.previous_method_signature(method),
            GraphLens::ClassMerger(lens) => lens.previous_method_signature(method),
        }
    }

    fn describe_lookup_field(&self, previous: FieldLookupResult) -> FieldLookupResult {
        match self {
            GraphLens::AccessModifier(_) => previous,
            GraphLens::MemberRebinding(lens) => lens.describe_lookup_field(previous),
            GraphLens::Repackaging(lens) => lens.describe_lookup_field(previous),
            GraphLens::ClassMerger(lens) => lens.describe_lookup_field(previous),
        }
    }

    fn describe_lookup_method(&self, previous: MethodLookupResult) -> MethodLookupResult {
        match self {
            GraphLens::AccessModifier(lens) => lens.describe_lookup_method(previous),
            GraphLens::MemberRebinding(lens) => lens.describe_lookup_method(previous),
            GraphLens::Repackaging(lens) => lens.describe_lookup_method(previous),
            GraphLens::ClassMerger(lens) => lens.describe_lookup_method(previous),
        }
    }

    fn next_package_name<'a>(&'a self, package: &'a str) -> &'a str {
        match self {
            GraphLens::Repackaging(lens) => lens.next_package_name(package),
            _ => package,
        }
    }
}

impl From<AccessModifierLens> for GraphLens {
    fn from(lens: AccessModifierLens) -> Self {
        GraphLens::AccessModifier(lens)
    }
}

impl From<RepackagingLens> for GraphLens {
    fn from(lens: RepackagingLens) -> Self {
        GraphLens::Repackaging(lens)
    }
}

impl From<MemberRebindingLens> for GraphLens {
    fn from(lens: MemberRebindingLens) -> Self {
        GraphLens::MemberRebinding(lens)
    }
}

impl From<ClassMergerLens> for GraphLens {
    fn from(lens: ClassMergerLens) -> Self {
        GraphLens::ClassMerger(lens)
    }
}

/// The composed view over all transformation stages so far.
///
/// Lenses sit in construction order, oldest first. Every pass that rewrites
/// references pushes its lens; downstream consumers resolve any
/// original-program reference to its current meaning through the chain.
#[derive(Debug, Default)]
pub struct LensChain {
    lenses: Vec<GraphLens>,
}

impl LensChain {
    /// The identity chain: no transformation has happened yet.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Appends the lens of the pass that just completed.
    pub fn push(&mut self, lens: impl Into<GraphLens>) {
        self.lenses.push(lens.into());
    }

    /// Chain length; 0 is the identity chain.
    pub fn len(&self) -> usize {
        self.lenses.len()
    }

    /// Whether this is the identity chain.
    pub fn is_identity(&self) -> bool {
        self.lenses.is_empty()
    }

    /// The lenses, oldest first.
    pub fn lenses(&self) -> &[GraphLens] {
        &self.lenses
    }

    /// Resolves a type to its current meaning.
    ///
    /// Class types walk the chain; array types follow their base type;
    /// primitives and void resolve to themselves.
    pub fn lookup_type(&self, type_ref: &TypeRef) -> TypeRef {
        rewrite_type(type_ref, &|class_type| self.lookup_class_type(class_type))
    }

    fn lookup_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        self.lenses
            .iter()
            .fold(type_ref.clone(), |current, lens| lens.next_class_type(&current))
    }

    /// Resolves a field reference to its current meaning.
    pub fn lookup_field(&self, field: &FieldRef) -> FieldLookupResult {
        self.lenses
            .iter()
            .fold(FieldLookupResult::identity(field.clone()), |previous, lens| {
                lens.describe_lookup_field(previous)
            })
    }

    /// Resolves a method reference and its invoke kind to their current
    /// meaning.
    ///
    /// References held by array types (clone and friends) only ever change
    /// through their element type; the invoke kind is untouchable there.
    pub fn lookup_method(&self, method: &MethodRef, invoke_kind: InvokeKind) -> MethodLookupResult {
        if method.holder().is_array_type() {
            let reference = method.with_holder(self.lookup_type(method.holder()));
            return MethodLookupResult::identity(reference, invoke_kind);
        }
        self.lenses.iter().fold(
            MethodLookupResult::identity(method.clone(), invoke_kind),
            |previous, lens| lens.describe_lookup_method(previous),
        )
    }

    /// The current signature of a method, ignoring dispatch.
    pub fn next_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.lenses
            .iter()
            .fold(method.clone(), |current, lens| lens.next_method_signature(&current))
    }

    /// The current signature of a field.
    pub fn next_field_signature(&self, field: &FieldRef) -> FieldRef {
        self.lenses
            .iter()
            .fold(field.clone(), |current, lens| lens.next_field_signature(&current))
    }

    /// Recovers the original signature of a method, walking newest to
    /// oldest through the inverse maps.
    pub fn previous_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.lenses
            .iter()
            .rev()
            .fold(method.clone(), |current, lens| lens.previous_method_signature(&current))
    }

    /// Recovers the original signature of a field.
    pub fn previous_field_signature(&self, field: &FieldRef) -> FieldRef {
        self.lenses
            .iter()
            .rev()
            .fold(field.clone(), |current, lens| lens.previous_field_signature(&current))
    }

    /// Recovers the original class type where the chain admits an inverse.
    pub fn previous_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        self.lenses
            .iter()
            .rev()
            .fold(type_ref.clone(), |current, lens| lens.previous_class_type(&current))
    }

    /// Resolves a package name through every repackaging stage, oldest
    /// renames first.
    pub fn lookup_package_name<'a>(&'a self, package: &'a str) -> &'a str {
        self.lenses
            .iter()
            .fold(package, |current, lens| lens.next_package_name(current))
    }

    /// Whether `from` became `to` solely by repackaging, with no
    /// signature-level change beyond exact type renames.
    pub fn is_simple_renaming(&self, from: &Reference, to: &Reference) -> bool {
        self.lenses.iter().any(|lens| match lens {
            GraphLens::Repackaging(repackaging) => repackaging.is_simple_renaming(from, to),
            _ => false,
        })
    }
}
