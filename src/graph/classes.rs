//! The abstract program graph.
//!
//! The rewriting core never sees class file bytes; it consumes an already
//! parsed, closed set of classes with their members and the member references
//! each method body makes. [`ProgramGraph`] is that closed set, with
//! deterministic iteration order and superclass-chain member resolution.

use std::collections::{HashMap, HashSet};

use bitflags::bitflags;

use crate::{
    graph::{FieldRef, MethodRef, TypeRef},
    Error, Result,
};

bitflags! {
    /// Access and kind flags of a program class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassFlags: u32 {
        /// Publicly accessible.
        const PUBLIC = 0x0001;
        /// Cannot be subclassed.
        const FINAL = 0x0010;
        /// An interface.
        const INTERFACE = 0x0200;
        /// Cannot be instantiated.
        const ABSTRACT = 0x0400;
        /// Compiler-introduced, not present in source.
        const SYNTHETIC = 0x1000;
        /// An annotation type.
        const ANNOTATION = 0x2000;
    }
}

bitflags! {
    /// Access flags of a program member (field or method).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemberFlags: u32 {
        /// Publicly accessible.
        const PUBLIC = 0x0001;
        /// Accessible only from the declaring class.
        const PRIVATE = 0x0002;
        /// No receiver.
        const STATIC = 0x0008;
        /// Cannot be overridden.
        const FINAL = 0x0010;
        /// Declared without a body.
        const ABSTRACT = 0x0400;
    }
}

/// A field definition inside a program class.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    reference: FieldRef,
    flags: MemberFlags,
}

impl FieldDefinition {
    /// Creates a field definition.
    pub fn new(reference: FieldRef, flags: MemberFlags) -> Self {
        Self { reference, flags }
    }

    /// The field's identity.
    pub fn reference(&self) -> &FieldRef {
        &self.reference
    }

    /// The field's access flags.
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }
}

/// A method definition inside a program class.
///
/// Besides its identity and flags, a method carries the member references its
/// body makes — the call and field-access edges of the abstract graph. The
/// referenced-members sweep walks these edges to seed member rebinding.
#[derive(Debug, Clone)]
pub struct MethodDefinition {
    reference: MethodRef,
    flags: MemberFlags,
    referenced_fields: Vec<FieldRef>,
    referenced_methods: Vec<MethodRef>,
}

impl MethodDefinition {
    /// Creates a method definition with no outgoing references.
    pub fn new(reference: MethodRef, flags: MemberFlags) -> Self {
        Self {
            reference,
            flags,
            referenced_fields: Vec::new(),
            referenced_methods: Vec::new(),
        }
    }

    /// Attaches the field references made by this method's body.
    #[must_use]
    pub fn with_field_references(mut self, fields: Vec<FieldRef>) -> Self {
        self.referenced_fields = fields;
        self
    }

    /// Attaches the method references made by this method's body.
    #[must_use]
    pub fn with_method_references(mut self, methods: Vec<MethodRef>) -> Self {
        self.referenced_methods = methods;
        self
    }

    /// The method's identity.
    pub fn reference(&self) -> &MethodRef {
        &self.reference
    }

    /// The method's access flags.
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    /// Field references made by this method's body.
    pub fn referenced_fields(&self) -> &[FieldRef] {
        &self.referenced_fields
    }

    /// Method references made by this method's body.
    pub fn referenced_methods(&self) -> &[MethodRef] {
        &self.referenced_methods
    }
}

/// A class in the program graph.
#[derive(Debug, Clone)]
pub struct ProgramClass {
    reference: TypeRef,
    flags: ClassFlags,
    superclass: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    fields: Vec<FieldDefinition>,
    methods: Vec<MethodDefinition>,
}

impl ProgramClass {
    /// Starts building a class for the given type.
    pub fn builder(reference: TypeRef) -> ProgramClassBuilder {
        ProgramClassBuilder {
            class: ProgramClass {
                reference,
                flags: ClassFlags::PUBLIC,
                superclass: None,
                interfaces: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
            },
        }
    }

    /// The class's type identity.
    pub fn reference(&self) -> &TypeRef {
        &self.reference
    }

    /// The class's flags.
    pub fn flags(&self) -> ClassFlags {
        self.flags
    }

    /// The direct superclass, if any.
    pub fn superclass(&self) -> Option<&TypeRef> {
        self.superclass.as_ref()
    }

    /// Directly implemented interfaces.
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    /// Declared fields.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Declared methods.
    pub fn methods(&self) -> &[MethodDefinition] {
        &self.methods
    }

    /// Whether this class is an interface.
    pub fn is_interface(&self) -> bool {
        self.flags.contains(ClassFlags::INTERFACE)
    }

    /// Whether this class is an annotation type.
    pub fn is_annotation(&self) -> bool {
        self.flags.contains(ClassFlags::ANNOTATION)
    }

    /// The slash-separated package this class lives in.
    pub fn package(&self) -> &str {
        self.reference.package()
    }

    /// Looks up a declared method matching `reference`'s name and prototype.
    pub fn lookup_method(&self, reference: &MethodRef) -> Option<&MethodDefinition> {
        self.methods
            .iter()
            .find(|method| method.reference().matches_signature(reference))
    }

    /// Looks up a declared field matching `reference`'s name and type.
    pub fn lookup_field(&self, reference: &FieldRef) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| {
            field.reference().name() == reference.name()
                && field.reference().field_type() == reference.field_type()
        })
    }

    /// Default methods declared by this interface: non-abstract, non-static
    /// instance methods. Empty for non-interfaces.
    pub fn default_methods(&self) -> impl Iterator<Item = &MethodDefinition> {
        let is_interface = self.is_interface();
        self.methods.iter().filter(move |method| {
            is_interface
                && !method.flags().contains(MemberFlags::ABSTRACT)
                && !method.flags().contains(MemberFlags::STATIC)
                && !method.flags().contains(MemberFlags::PRIVATE)
        })
    }
}

/// Fluent builder for [`ProgramClass`].
pub struct ProgramClassBuilder {
    class: ProgramClass,
}

impl ProgramClassBuilder {
    /// Replaces the class flags.
    #[must_use]
    pub fn flags(mut self, flags: ClassFlags) -> Self {
        self.class.flags = flags;
        self
    }

    /// Sets the direct superclass.
    #[must_use]
    pub fn superclass(mut self, superclass: TypeRef) -> Self {
        self.class.superclass = Some(superclass);
        self
    }

    /// Adds a directly implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.class.interfaces.push(interface);
        self
    }

    /// Adds a field definition.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.class.fields.push(field);
        self
    }

    /// Adds a method definition.
    #[must_use]
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.class.methods.push(method);
        self
    }

    /// Finishes the class.
    #[must_use]
    pub fn build(self) -> ProgramClass {
        self.class
    }
}

/// The closed set of program classes.
///
/// Classes iterate in registration order, which keeps every downstream
/// decision (initial merge grouping, lens construction) deterministic across
/// runs. Member resolution walks the superclass chain and then the transitive
/// superinterfaces, mirroring how the runtime would bind the member.
#[derive(Debug, Default)]
pub struct ProgramGraph {
    classes: Vec<ProgramClass>,
    index: HashMap<TypeRef, usize>,
}

impl ProgramGraph {
    /// Creates an empty program graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateClass`] if a class with the same type is
    /// already registered.
    pub fn add_class(&mut self, class: ProgramClass) -> Result<()> {
        if self.index.contains_key(class.reference()) {
            return Err(Error::DuplicateClass(class.reference().clone()));
        }
        self.index.insert(class.reference().clone(), self.classes.len());
        self.classes.push(class);
        Ok(())
    }

    /// Looks up a class by type.
    pub fn class(&self, reference: &TypeRef) -> Option<&ProgramClass> {
        self.index.get(reference).map(|&index| &self.classes[index])
    }

    /// Whether the graph contains a class for `reference`.
    pub fn contains(&self, reference: &TypeRef) -> bool {
        self.index.contains_key(reference)
    }

    /// Whether `reference` names an interface in this program.
    ///
    /// Unknown types are not interfaces.
    pub fn is_interface(&self, reference: &TypeRef) -> bool {
        self.class(reference).is_some_and(ProgramClass::is_interface)
    }

    /// All classes, in registration order.
    pub fn classes(&self) -> &[ProgramClass] {
        &self.classes
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the graph holds no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Resolves a method reference to the class that actually declares it.
    ///
    /// Walks the holder's superclass chain first, then the transitive
    /// superinterfaces. Returns `None` when the holder is outside the program
    /// or no declaration is found; rebinding treats both as "leave the
    /// reference alone".
    pub fn resolve_method(&self, reference: &MethodRef) -> Option<MethodRef> {
        self.resolve(reference.holder(), &mut |class| {
            class
                .lookup_method(reference)
                .map(|_| reference.with_holder(class.reference().clone()))
        })
    }

    /// Resolves a field reference to the class that actually declares it.
    pub fn resolve_field(&self, reference: &FieldRef) -> Option<FieldRef> {
        self.resolve(reference.holder(), &mut |class| {
            class
                .lookup_field(reference)
                .map(|_| reference.with_holder(class.reference().clone()))
        })
    }

    fn resolve<R>(
        &self,
        holder: &TypeRef,
        lookup: &mut dyn FnMut(&ProgramClass) -> Option<R>,
    ) -> Option<R> {
        // Superclass chain first.
        let mut interfaces = Vec::new();
        let mut current = Some(holder.clone());
        while let Some(type_ref) = current {
            let class = self.class(&type_ref)?;
            if let Some(resolved) = lookup(class) {
                return Some(resolved);
            }
            interfaces.extend(class.interfaces().iter().cloned());
            current = class.superclass().cloned();
        }

        // Then the transitive superinterfaces.
        let mut seen: HashSet<TypeRef> = HashSet::new();
        while let Some(type_ref) = interfaces.pop() {
            if !seen.insert(type_ref.clone()) {
                continue;
            }
            if let Some(class) = self.class(&type_ref) {
                if let Some(resolved) = lookup(class) {
                    return Some(resolved);
                }
                interfaces.extend(class.interfaces().iter().cloned());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(holder: &TypeRef, name: &str) -> MethodRef {
        MethodRef::new(
            holder.clone(),
            name,
            TypeRef::from_descriptor("V").unwrap(),
            Vec::new(),
        )
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let a = TypeRef::class("A");
        let mut graph = ProgramGraph::new();
        graph.add_class(ProgramClass::builder(a.clone()).build()).unwrap();
        let result = graph.add_class(ProgramClass::builder(a).build());
        assert!(matches!(result, Err(Error::DuplicateClass(_))));
    }

    #[test]
    fn method_resolution_walks_superclasses() {
        let base = TypeRef::class("Base");
        let derived = TypeRef::class("Derived");
        let mut graph = ProgramGraph::new();
        graph
            .add_class(
                ProgramClass::builder(base.clone())
                    .method(MethodDefinition::new(method(&base, "m"), MemberFlags::PUBLIC))
                    .build(),
            )
            .unwrap();
        graph
            .add_class(
                ProgramClass::builder(derived.clone())
                    .superclass(base.clone())
                    .build(),
            )
            .unwrap();

        let resolved = graph.resolve_method(&method(&derived, "m")).unwrap();
        assert_eq!(resolved.holder(), &base);
    }

    #[test]
    fn method_resolution_reaches_superinterfaces() {
        let iface = TypeRef::class("I");
        let class = TypeRef::class("C");
        let mut graph = ProgramGraph::new();
        graph
            .add_class(
                ProgramClass::builder(iface.clone())
                    .flags(ClassFlags::PUBLIC | ClassFlags::INTERFACE | ClassFlags::ABSTRACT)
                    .method(MethodDefinition::new(method(&iface, "m"), MemberFlags::PUBLIC))
                    .build(),
            )
            .unwrap();
        graph
            .add_class(
                ProgramClass::builder(class.clone())
                    .implements(iface.clone())
                    .build(),
            )
            .unwrap();

        let resolved = graph.resolve_method(&method(&class, "m")).unwrap();
        assert_eq!(resolved.holder(), &iface);
    }
}
