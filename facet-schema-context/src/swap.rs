use alloc::string::String;
use core::fmt;

use crate::{ClassRef, TypeRef};

/// Bounded-recursion policy for a property.
///
/// With `depth = N > 0`, a property may already appear `N` times on the
/// current path and still be descended into; one more and it is replaced by
/// the [`Terminator`]. With `depth <= 0` any recurrence is a cyclic reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unroll {
    /// Number of equivalent occurrences tolerated on the path.
    pub depth: i32,

    /// What to emit once `depth` is exceeded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub terminator: Terminator,
}

impl Unroll {
    /// Unroll `depth` times, then drop the field.
    pub fn new(depth: i32) -> Self {
        Self {
            depth,
            terminator: Terminator::Omit,
        }
    }

    /// Unroll `depth` times, then substitute `terminator`.
    pub fn with_terminator(depth: i32, terminator: TypeRef) -> Self {
        Self {
            depth,
            terminator: Terminator::Type(terminator),
        }
    }

    /// Whether this policy permits any recurrence at all.
    pub fn is_defined(&self) -> bool {
        self.depth > 0
    }
}

impl fmt::Display for Unroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unroll(depth={}, terminator={})", self.depth, self.terminator)
    }
}

/// What replaces a property once its [`Unroll`] depth is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Terminator {
    /// Leave the field out of the schema entirely.
    #[default]
    Omit,
    /// Emit this type instead, without descending into it.
    Type(TypeRef),
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Omit => f.write_str("omit"),
            Terminator::Type(ty) => write!(f, "{ty}"),
        }
    }
}

/// What a matched [`SchemaSwap`] does to the field it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SwapTarget {
    /// Generate the schema of this type instead of the field's own.
    Type(TypeRef),
    /// Drop the field from the schema.
    Ignore,
    /// Keep the field's type; the swap only contributes its unroll policy.
    Keep,
}

/// A user-declared override for the field `field` of class `original`.
///
/// Swaps are registered on the class that declares them and are visible to
/// every field reached while that class is being processed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaSwap {
    /// Class owning the field being overridden.
    pub original: ClassRef,

    /// Name of the overridden field on `original`.
    pub field: String,

    /// Replacement outcome.
    pub target: SwapTarget,

    /// Recursion policy attached to the field when the swap matches.
    #[cfg_attr(feature = "serde", serde(default))]
    pub unroll: Option<Unroll>,
}

impl SchemaSwap {
    /// Replace the type of `original.field` with `target`.
    pub fn replace(original: ClassRef, field: impl Into<String>, target: TypeRef) -> Self {
        Self {
            original,
            field: field.into(),
            target: SwapTarget::Type(target),
            unroll: None,
        }
    }

    /// Drop `original.field` from the schema.
    pub fn ignore(original: ClassRef, field: impl Into<String>) -> Self {
        Self {
            original,
            field: field.into(),
            target: SwapTarget::Ignore,
            unroll: None,
        }
    }

    /// Keep the type of `original.field` but bound its recursion.
    pub fn unroll(original: ClassRef, field: impl Into<String>, unroll: Unroll) -> Self {
        Self {
            original,
            field: field.into(),
            target: SwapTarget::Keep,
            unroll: Some(unroll),
        }
    }

    /// Attach a recursion policy to this swap.
    pub fn with_unroll(mut self, unroll: Unroll) -> Self {
        self.unroll = Some(unroll);
        self
    }
}

impl fmt::Display for SchemaSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swap({}.{} -> ", self.original, self.field)?;
        match &self.target {
            SwapTarget::Type(ty) => write!(f, "{ty}")?,
            SwapTarget::Ignore => f.write_str("ignored")?,
            SwapTarget::Keep => f.write_str("unchanged")?,
        }
        if let Some(unroll) = &self.unroll {
            write!(f, ", {unroll}")?;
        }
        f.write_str(")")
    }
}
