//! Repackaging lens.
//!
//! A pure type-and-package rename: classes move to new packages (typically to
//! maximize package-private access opportunities) and their members move with
//! them. Members never move independently here — a member signature changes
//! only because types in it moved.
//!
//! Downstream passes ask [`RepackagingLens::is_simple_renaming`] to decide
//! whether a reference change is attributable solely to repackaging; a simple
//! renaming needs no signature-level remapping bookkeeping (debug info can be
//! rewritten by name substitution alone).

use std::collections::HashMap;

use crate::{
    collections::{BidirectionalOneToOneMap, ConcurrentOneToOneBuilder},
    graph::{FieldRef, MethodRef, Reference, TypeRef},
    lens::{rewrite_field_types, rewrite_method_types, FieldLookupResult, MethodLookupResult},
};

/// Immutable lens over one repackaging pass.
#[derive(Debug)]
pub struct RepackagingLens {
    new_types: BidirectionalOneToOneMap<TypeRef, TypeRef>,
    new_field_signatures: BidirectionalOneToOneMap<FieldRef, FieldRef>,
    new_method_signatures: BidirectionalOneToOneMap<MethodRef, MethodRef>,
    package_renamings: HashMap<String, String>,
    empty: bool,
}

impl RepackagingLens {
    /// Starts building a repackaging lens.
    pub fn builder() -> RepackagingLensBuilder {
        RepackagingLensBuilder::default()
    }

    /// Whether this is the dedicated always-empty lens.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// This lens's own package-rename step, identity by default.
    ///
    /// The chain composes this after resolving the package through all
    /// earlier lenses.
    pub fn next_package_name<'a>(&'a self, package: &'a str) -> &'a str {
        self.package_renamings.get(package).map_or(package, String::as_str)
    }

    /// The repackaged class type, or `type_ref` itself when unaffected.
    pub fn next_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        self.new_types.get(type_ref).cloned().unwrap_or_else(|| type_ref.clone())
    }

    /// The class type a repackaged type had before this pass.
    pub fn previous_class_type(&self, type_ref: &TypeRef) -> TypeRef {
        self.new_types.get_key(type_ref).cloned().unwrap_or_else(|| type_ref.clone())
    }

    /// The repackaged field signature, or the holder/signature types
    /// rewritten through the type map when no explicit move was recorded.
    pub fn next_field_signature(&self, field: &FieldRef) -> FieldRef {
        self.new_field_signatures.get(field).cloned().unwrap_or_else(|| {
            rewrite_field_types(field, &|type_ref| self.next_class_type(type_ref))
        })
    }

    /// The field signature as of before this pass.
    pub fn previous_field_signature(&self, field: &FieldRef) -> FieldRef {
        self.new_field_signatures.get_key(field).cloned().unwrap_or_else(|| {
            rewrite_field_types(field, &|type_ref| self.previous_class_type(type_ref))
        })
    }

    /// The repackaged method signature, analogous to
    /// [`RepackagingLens::next_field_signature`].
    pub fn next_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.new_method_signatures.get(method).cloned().unwrap_or_else(|| {
            rewrite_method_types(method, &|type_ref| self.next_class_type(type_ref))
        })
    }

    /// The method signature as of before this pass.
    pub fn previous_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.new_method_signatures.get_key(method).cloned().unwrap_or_else(|| {
            rewrite_method_types(method, &|type_ref| self.previous_class_type(type_ref))
        })
    }

    /// Whether `from` became `to` solely by repackaging.
    ///
    /// True when every base type the two references mention is either
    /// identical or related by this lens's exact type-rename map. Equal
    /// references are a caller bug: there is no renaming to classify.
    pub fn is_simple_renaming(&self, from: &Reference, to: &Reference) -> bool {
        if from == to {
            debug_assert!(false, "the from and to references should not be equal");
            return false;
        }
        let from_types = from.referenced_base_types();
        let to_types = to.referenced_base_types();
        if from_types.len() != to_types.len() {
            return false;
        }
        from_types
            .iter()
            .zip(to_types.iter())
            .all(|(from_type, to_type)| self.is_simple_type_renaming_or_equal(from_type, to_type))
    }

    fn is_simple_type_renaming_or_equal(&self, from: &TypeRef, to: &TypeRef) -> bool {
        from == to || self.new_types.get(from) == Some(to)
    }

    pub(crate) fn describe_lookup_field(&self, previous: FieldLookupResult) -> FieldLookupResult {
        let reference = self.next_field_signature(&previous.reference);
        let rebound_reference = self.next_field_signature(&previous.rebound_reference);
        if reference != previous.reference || rebound_reference != previous.rebound_reference {
            FieldLookupResult {
                reference,
                rebound_reference,
            }
        } else {
            previous
        }
    }

    pub(crate) fn describe_lookup_method(&self, previous: MethodLookupResult) -> MethodLookupResult {
        let reference = self.next_method_signature(&previous.reference);
        let rebound_reference = self.next_method_signature(&previous.rebound_reference);
        if reference != previous.reference || rebound_reference != previous.rebound_reference {
            MethodLookupResult {
                reference,
                rebound_reference,
                // Package moves never change how a method is dispatched.
                invoke_kind: previous.invoke_kind,
            }
        } else {
            previous
        }
    }
}

/// Builder for [`RepackagingLens`], safe for concurrent recording.
#[derive(Default)]
pub struct RepackagingLensBuilder {
    new_types: ConcurrentOneToOneBuilder<TypeRef, TypeRef>,
    new_field_signatures: ConcurrentOneToOneBuilder<FieldRef, FieldRef>,
    new_method_signatures: ConcurrentOneToOneBuilder<MethodRef, MethodRef>,
}

impl RepackagingLensBuilder {
    /// Records a type move.
    pub fn record_type_move(&self, from: TypeRef, to: TypeRef) {
        assert_ne!(from, to);
        self.new_types.put(from, to);
    }

    /// Records a field move caused by its holder moving.
    pub fn record_field_move(&self, from: FieldRef, to: FieldRef) {
        assert_ne!(from, to);
        self.new_field_signatures.put(from, to);
    }

    /// Records a method move caused by its holder moving.
    pub fn record_method_move(&self, from: MethodRef, to: MethodRef) {
        assert_ne!(from, to);
        self.new_method_signatures.put(from, to);
    }

    /// Freezes the builder into an immutable lens.
    ///
    /// A repackaging pass that moved nothing must use
    /// [`RepackagingLensBuilder::build_empty`] instead; building with an
    /// empty type map is asserted against.
    #[must_use]
    pub fn build(self, package_renamings: HashMap<String, String>) -> RepackagingLens {
        assert!(!self.new_types.is_empty());
        RepackagingLens {
            new_types: self.new_types.freeze(),
            new_field_signatures: self.new_field_signatures.freeze(),
            new_method_signatures: self.new_method_signatures.freeze(),
            package_renamings,
            empty: false,
        }
    }

    /// The dedicated always-empty lens, the only variant permitted to carry
    /// empty backing maps.
    #[must_use]
    pub fn build_empty(self) -> RepackagingLens {
        debug_assert!(self.new_types.is_empty());
        RepackagingLens {
            new_types: BidirectionalOneToOneMap::new(),
            new_field_signatures: BidirectionalOneToOneMap::new(),
            new_method_signatures: BidirectionalOneToOneMap::new(),
            package_renamings: HashMap::new(),
            empty: true,
        }
    }
}
