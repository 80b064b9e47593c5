//! Program reference identities.
//!
//! References are the immutable identity keys the whole rewriting core
//! operates on: a [`TypeRef`] is a JVM-style type descriptor, while
//! [`FieldRef`] and [`MethodRef`] additionally carry their holder type and
//! signature. References are pure values — equal content means equal identity,
//! and all of them are usable as map keys.
//!
//! # Key Components
//!
//! - [`TypeRef`] - Descriptor-backed type identity (`Lcom/foo/Bar;`, `[I`, `V`, ...)
//! - [`FieldRef`] / [`MethodRef`] - Member identities (holder + signature)
//! - [`Reference`] - Closed union over the three reference categories
//! - [`InvokeKind`] - The dispatch kind carried by method lookups
//!
//! # Descriptor Handling
//!
//! Lens maps only ever record class types. Array types rewrite through their
//! base type (`[Lcom/foo/Bar;` follows whatever `Lcom/foo/Bar;` maps to), and
//! primitives and `void` are fixpoints of every lookup.

use std::fmt;
use std::sync::Arc;

use crate::Result;

/// Descriptor characters that denote primitive (and `void`) types.
const PRIMITIVE_DESCRIPTORS: &[u8] = b"VZBSCIJFD";

/// An immutable type identity, backed by a JVM-style descriptor.
///
/// Cheap to clone (the descriptor is reference counted) and usable as a map
/// key. Construction goes through [`TypeRef::from_descriptor`] for untrusted
/// input or the infallible [`TypeRef::class`] helper for known class names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    descriptor: Arc<str>,
}

impl TypeRef {
    /// Parses a type descriptor, validating its shape.
    ///
    /// Accepted forms are a single primitive/void character (`I`, `J`, `V`,
    /// ...), a class descriptor (`Lcom/foo/Bar;`) and array descriptors with
    /// one or more leading `[` over a non-void element type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the descriptor does not match
    /// any of the accepted forms.
    pub fn from_descriptor(descriptor: &str) -> Result<Self> {
        let bytes = descriptor.as_bytes();
        let element = bytes
            .iter()
            .position(|&b| b != b'[')
            .ok_or_else(|| malformed_error!("type descriptor '{}' has no element type", descriptor))?;
        let rest = &bytes[element..];
        let valid = match rest {
            [b'L', body @ .., b';'] => !body.is_empty(),
            [primitive] => {
                PRIMITIVE_DESCRIPTORS.contains(primitive) && (element == 0 || *primitive != b'V')
            }
            _ => false,
        };
        if !valid {
            return Err(malformed_error!("invalid type descriptor '{}'", descriptor));
        }
        Ok(Self {
            descriptor: Arc::from(descriptor),
        })
    }

    /// Creates a class type from a dotted or slash-separated binary name.
    pub fn class(name: &str) -> Self {
        let internal = name.replace('.', "/");
        Self {
            descriptor: Arc::from(format!("L{internal};")),
        }
    }

    /// Creates a one-dimensional array type over `self`.
    #[must_use]
    pub fn array_of(&self) -> Self {
        Self {
            descriptor: Arc::from(format!("[{}", self.descriptor)),
        }
    }

    /// The raw descriptor string.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Whether this is a class type (`L...;`).
    pub fn is_class_type(&self) -> bool {
        self.descriptor.starts_with('L')
    }

    /// Whether this is an array type (`[...`).
    pub fn is_array_type(&self) -> bool {
        self.descriptor.starts_with('[')
    }

    /// Whether this is a primitive or void type.
    pub fn is_primitive(&self) -> bool {
        !self.is_class_type() && !self.is_array_type()
    }

    /// Strips all array dimensions, yielding the element's base type.
    ///
    /// For non-array types this is the type itself.
    #[must_use]
    pub fn base_type(&self) -> Self {
        if !self.is_array_type() {
            return self.clone();
        }
        let stripped = self.descriptor.trim_start_matches('[');
        Self {
            descriptor: Arc::from(stripped),
        }
    }

    /// Replaces the base type while preserving array dimensions.
    #[must_use]
    pub fn replace_base_type(&self, new_base: &TypeRef) -> Self {
        let dimensions = self.descriptor.len() - self.descriptor.trim_start_matches('[').len();
        if dimensions == 0 {
            return new_base.clone();
        }
        let mut descriptor = String::with_capacity(dimensions + new_base.descriptor.len());
        descriptor.extend(std::iter::repeat('[').take(dimensions));
        descriptor.push_str(&new_base.descriptor);
        Self {
            descriptor: Arc::from(descriptor),
        }
    }

    /// The internal (slash-separated) class name, without `L`/`;` framing.
    ///
    /// Empty for non-class types.
    pub fn internal_name(&self) -> &str {
        if self.is_class_type() {
            &self.descriptor[1..self.descriptor.len() - 1]
        } else {
            ""
        }
    }

    /// The slash-separated package of a class type, `""` for the default
    /// package and for non-class types.
    pub fn package(&self) -> &str {
        match self.internal_name().rfind('/') {
            Some(index) => &self.internal_name()[..index],
            None => "",
        }
    }

    /// Moves a class type into another package, keeping its simple name.
    ///
    /// Must only be called on class types.
    #[must_use]
    pub fn with_package(&self, package: &str) -> Self {
        assert!(self.is_class_type());
        let simple = match self.internal_name().rfind('/') {
            Some(index) => &self.internal_name()[index + 1..],
            None => self.internal_name(),
        };
        if package.is_empty() {
            Self::class(simple)
        } else {
            Self::class(&format!("{package}/{simple}"))
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

/// An immutable field identity: holder type, name and field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    holder: TypeRef,
    name: Arc<str>,
    field_type: TypeRef,
}

impl FieldRef {
    /// Creates a field reference.
    pub fn new(holder: TypeRef, name: &str, field_type: TypeRef) -> Self {
        Self {
            holder,
            name: Arc::from(name),
            field_type,
        }
    }

    /// The type declaring (or believed to declare) this field.
    pub fn holder(&self) -> &TypeRef {
        &self.holder
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's declared type.
    pub fn field_type(&self) -> &TypeRef {
        &self.field_type
    }

    /// The same field signature on a different holder.
    #[must_use]
    pub fn with_holder(&self, holder: TypeRef) -> Self {
        Self {
            holder,
            name: Arc::clone(&self.name),
            field_type: self.field_type.clone(),
        }
    }

    /// All base types this reference mentions: the holder plus the field
    /// type's base type. Used by structural simple-renaming checks.
    pub fn referenced_base_types(&self) -> Vec<TypeRef> {
        vec![self.holder.base_type(), self.field_type.base_type()]
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.holder, self.name, self.field_type)
    }
}

/// An immutable method identity: holder type, name and prototype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    holder: TypeRef,
    name: Arc<str>,
    return_type: TypeRef,
    parameters: Arc<[TypeRef]>,
}

impl MethodRef {
    /// Creates a method reference.
    pub fn new(holder: TypeRef, name: &str, return_type: TypeRef, parameters: Vec<TypeRef>) -> Self {
        Self {
            holder,
            name: Arc::from(name),
            return_type,
            parameters: Arc::from(parameters),
        }
    }

    /// The type declaring (or believed to declare) this method.
    pub fn holder(&self) -> &TypeRef {
        &self.holder
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared return type.
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// The declared parameter types.
    pub fn parameters(&self) -> &[TypeRef] {
        &self.parameters
    }

    /// The same method signature on a different holder.
    #[must_use]
    pub fn with_holder(&self, holder: TypeRef) -> Self {
        Self {
            holder,
            name: Arc::clone(&self.name),
            return_type: self.return_type.clone(),
            parameters: Arc::clone(&self.parameters),
        }
    }

    /// Whether `other` declares the same name and prototype, ignoring the
    /// holder. This is the identity resolution matches on.
    pub fn matches_signature(&self, other: &MethodRef) -> bool {
        self.name == other.name
            && self.return_type == other.return_type
            && self.parameters == other.parameters
    }

    /// All base types this reference mentions: the holder plus the base types
    /// of the return type and every parameter.
    pub fn referenced_base_types(&self) -> Vec<TypeRef> {
        let mut types = Vec::with_capacity(2 + self.parameters.len());
        types.push(self.holder.base_type());
        types.push(self.return_type.base_type());
        types.extend(self.parameters.iter().map(TypeRef::base_type));
        types
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}(", self.holder, self.name)?;
        for parameter in self.parameters.iter() {
            write!(f, "{parameter}")?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// A program reference of any category.
///
/// The three categories form a closed union so that lookup dispatch stays
/// exhaustive and compiler checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// A type reference.
    Type(TypeRef),
    /// A field reference.
    Field(FieldRef),
    /// A method reference.
    Method(MethodRef),
}

impl Reference {
    /// All base types mentioned by this reference.
    pub fn referenced_base_types(&self) -> Vec<TypeRef> {
        match self {
            Reference::Type(type_ref) => vec![type_ref.base_type()],
            Reference::Field(field) => field.referenced_base_types(),
            Reference::Method(method) => method.referenced_base_types(),
        }
    }
}

impl From<TypeRef> for Reference {
    fn from(type_ref: TypeRef) -> Self {
        Reference::Type(type_ref)
    }
}

impl From<FieldRef> for Reference {
    fn from(field: FieldRef) -> Self {
        Reference::Field(field)
    }
}

impl From<MethodRef> for Reference {
    fn from(method: MethodRef) -> Self {
        Reference::Method(method)
    }
}

/// The dispatch kind of a method invocation.
///
/// Lenses may change the kind of an invoke: publicizing a private method
/// turns `Direct` invokes into `Virtual` or `Interface` ones, and merging an
/// interface into a class turns `Interface` invokes into `Virtual` ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    /// Direct dispatch (private methods, constructors).
    Direct,
    /// Virtual dispatch through a class.
    Virtual,
    /// Dispatch through an interface.
    Interface,
    /// Static dispatch, no receiver.
    Static,
    /// Super call dispatch. No lens in this core introduces it; it passes
    /// through lookups unchanged.
    Super,
}

impl InvokeKind {
    /// Whether this is a direct invoke, the only kind access widening affects.
    pub fn is_direct(self) -> bool {
        matches!(self, InvokeKind::Direct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_validation() {
        assert!(TypeRef::from_descriptor("Lcom/foo/Bar;").is_ok());
        assert!(TypeRef::from_descriptor("I").is_ok());
        assert!(TypeRef::from_descriptor("[[J").is_ok());
        assert!(TypeRef::from_descriptor("[Lcom/foo/Bar;").is_ok());

        assert!(TypeRef::from_descriptor("").is_err());
        assert!(TypeRef::from_descriptor("com.foo.Bar").is_err());
        assert!(TypeRef::from_descriptor("L;").is_err());
        assert!(TypeRef::from_descriptor("[V").is_err());
        assert!(TypeRef::from_descriptor("[").is_err());
    }

    #[test]
    fn class_name_forms() {
        let dotted = TypeRef::class("com.foo.Bar");
        let slashed = TypeRef::class("com/foo/Bar");
        assert_eq!(dotted, slashed);
        assert_eq!(dotted.descriptor(), "Lcom/foo/Bar;");
        assert_eq!(dotted.package(), "com/foo");
        assert_eq!(dotted.internal_name(), "com/foo/Bar");
    }

    #[test]
    fn array_base_type_rewriting() {
        let base = TypeRef::class("com.foo.Bar");
        let array = base.array_of().array_of();
        assert!(array.is_array_type());
        assert_eq!(array.base_type(), base);

        let new_base = TypeRef::class("a.b");
        let rewritten = array.replace_base_type(&new_base);
        assert_eq!(rewritten.descriptor(), "[[La/b;");
        assert_eq!(rewritten.base_type(), new_base);
    }

    #[test]
    fn package_moves() {
        let original = TypeRef::class("com.foo.Bar");
        let moved = original.with_package("a");
        assert_eq!(moved.descriptor(), "La/Bar;");
        let default_package = original.with_package("");
        assert_eq!(default_package.descriptor(), "LBar;");
    }

    #[test]
    fn member_referenced_base_types() {
        let holder = TypeRef::class("com.foo.Bar");
        let string = TypeRef::class("java.lang.String");
        let method = MethodRef::new(
            holder.clone(),
            "m",
            string.array_of(),
            vec![TypeRef::from_descriptor("I").unwrap()],
        );
        let types = method.referenced_base_types();
        assert_eq!(types[0], holder);
        assert_eq!(types[1], string);
        assert_eq!(types[2].descriptor(), "I");
    }
}
