//! Type descriptors consumed by the traversal [`Context`](crate::Context).
//!
//! These are produced by whatever builds the type model (reflection, a
//! declarative registry, annotation parsing). The context never looks inside a
//! class: it only compares descriptors structurally, so a builder must hand out
//! equal values for equal types no matter where in the graph they appear.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::Unroll;

/// Scalar types that have no children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Primitive {
    /// Text
    String,
    /// Whole numbers
    Integer,
    /// Floating point numbers
    Number,
    /// `true` / `false`
    Boolean,
}

impl Primitive {
    /// Name used both for display and for the emitted schema `type`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
        }
    }
}

/// A named type with its generic arguments already expanded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassRef {
    /// Name of the class, unique within a type model.
    pub name: String,

    /// Generic arguments, in declaration order of the class parameters.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub args: Vec<TypeRef>,
}

impl ClassRef {
    /// A class without generic arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic class instantiated with `args`.
    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// A resolved type descriptor.
///
/// Equality is structural: `List<Ref2>` reached from two different fields is
/// the same `TypeRef`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TypeRef {
    /// A scalar.
    Primitive(Primitive),
    /// A user-defined type with fields.
    Class(ClassRef),
    /// A sequence of the inner type.
    List(Box<TypeRef>),
    /// A string-keyed map whose values are the inner type.
    Map(Box<TypeRef>),
    /// The inner type, or nothing.
    Optional(Box<TypeRef>),
    /// An arbitrary JSON value with no known structure.
    Raw,
    /// A generic parameter that has not been bound yet.
    ///
    /// Only appears in declarations; properties handed to the context are
    /// always fully resolved.
    Param(String),
}

impl TypeRef {
    /// Shorthand for [`TypeRef::Primitive`]`(`[`Primitive::String`]`)`.
    pub const STRING: TypeRef = TypeRef::Primitive(Primitive::String);
    /// Shorthand for [`TypeRef::Primitive`]`(`[`Primitive::Integer`]`)`.
    pub const INTEGER: TypeRef = TypeRef::Primitive(Primitive::Integer);
    /// Shorthand for [`TypeRef::Primitive`]`(`[`Primitive::Number`]`)`.
    pub const NUMBER: TypeRef = TypeRef::Primitive(Primitive::Number);
    /// Shorthand for [`TypeRef::Primitive`]`(`[`Primitive::Boolean`]`)`.
    pub const BOOLEAN: TypeRef = TypeRef::Primitive(Primitive::Boolean);

    /// A class without generic arguments.
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class(ClassRef::new(name))
    }

    /// `List<inner>`
    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// `Map<inner>`
    pub fn map(inner: TypeRef) -> Self {
        TypeRef::Map(Box::new(inner))
    }

    /// `Option<inner>`
    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    /// Generic parameter `name`.
    pub fn param(name: impl Into<String>) -> Self {
        TypeRef::Param(name.into())
    }

    /// The class this type refers to, if it is one.
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            TypeRef::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Whether a walker can descend into this type at all.
    pub fn has_children(&self) -> bool {
        match self {
            TypeRef::Primitive(_) | TypeRef::Raw | TypeRef::Param(_) => false,
            TypeRef::Class(_) => true,
            TypeRef::List(inner) | TypeRef::Map(inner) | TypeRef::Optional(inner) => {
                inner.has_children()
            }
        }
    }
}

impl From<ClassRef> for TypeRef {
    fn from(class: ClassRef) -> Self {
        TypeRef::Class(class)
    }
}

impl From<Primitive> for TypeRef {
    fn from(primitive: Primitive) -> Self {
        TypeRef::Primitive(primitive)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.as_str()),
            TypeRef::Class(class) => write!(f, "{class}"),
            TypeRef::List(inner) => write!(f, "List<{inner}>"),
            TypeRef::Map(inner) => write!(f, "Map<{inner}>"),
            TypeRef::Optional(inner) => write!(f, "Option<{inner}>"),
            TypeRef::Raw => f.write_str("RawJson"),
            TypeRef::Param(name) => f.write_str(name),
        }
    }
}

/// A field being visited: where it is declared, what it is called, and the
/// type the walker will descend into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// The class declaring this field. `None` only for the root property.
    pub declaring: Option<ClassRef>,

    /// Field name. Empty for the root property.
    pub name: String,

    /// Resolved type of the field, generics expanded.
    pub ty: TypeRef,

    /// How many times this property may recur on one path, and what replaces
    /// it after that. `None` forbids any recurrence.
    pub unroll: Option<Unroll>,
}

impl Property {
    /// A field `name` of type `ty`, declared on `declaring`.
    pub fn new(declaring: ClassRef, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            declaring: Some(declaring),
            name: name.into(),
            ty,
            unroll: None,
        }
    }

    /// The synthetic property standing for the type a walk starts from.
    pub fn root(ty: TypeRef) -> Self {
        Self {
            declaring: None,
            name: String::new(),
            ty,
            unroll: None,
        }
    }

    /// Attach (or clear) a recursion policy.
    pub fn with_unroll(mut self, unroll: Option<Unroll>) -> Self {
        self.unroll = unroll;
        self
    }

    /// Whether this is the synthetic root property.
    pub fn is_root(&self) -> bool {
        self.declaring.is_none()
    }

    /// Whether `other` counts as a recurrence of `self` along a path.
    ///
    /// The resolved types must match. Declaring types must match too, except
    /// that the root frame has no declaring context and matches on type alone.
    /// Field names and unroll policies are not compared.
    pub fn is_equivalent(&self, other: &Property) -> bool {
        if self.ty != other.ty {
            return false;
        }
        self.is_root() || other.is_root() || self.declaring == other.declaring
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{}: {}", self.name, self.ty)
        }
    }
}
