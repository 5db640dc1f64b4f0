use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::{ClassRef, Property, RegisteredSwap};

/// Everything that can go wrong while walking with a [`Context`](crate::Context).
///
/// None of these are recoverable: each one aborts schema generation for the
/// root type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// Two swaps for the same class and field were declared at the same scope.
    Conflict {
        /// Class the second swap was declared on.
        declared_on: ClassRef,
        /// The swap being registered.
        swap: RegisteredSwap,
        /// The swap already holding that key.
        existing: RegisteredSwap,
    },

    /// A scope closed while some of its swaps were never matched.
    UnmatchedSwaps {
        /// The offending swaps, in registration order.
        swaps: Vec<RegisteredSwap>,
    },

    /// A property recurred more often than its unroll policy allows, and the
    /// policy has no room to terminate it.
    CyclicReference {
        /// The open path, root first.
        path: Vec<Property>,
        /// The property that closed the cycle.
        property: Property,
    },

    /// Pushes and pops were not balanced by the caller.
    InternalInvariant {
        /// What was found out of place.
        reason: String,
    },
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::Conflict {
                declared_on,
                swap,
                existing,
            } => {
                write!(
                    f,
                    "conflicting schema swaps on {declared_on}: {swap} vs. {existing}"
                )
            }
            ContextError::UnmatchedSwaps { swaps } => {
                f.write_str("unmatched schema swaps: ")?;
                for (i, swap) in swaps.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{swap}")?;
                }
                Ok(())
            }
            ContextError::CyclicReference { path, property } => {
                f.write_str("found a cyclic reference: ")?;
                for (i, level) in path.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" -> ")?;
                    }
                    write!(f, "{level}")?;
                }
                write!(f, " !! {property}")
            }
            ContextError::InternalInvariant { reason } => {
                write!(f, "internal invariant violated: {reason}")
            }
        }
    }
}

impl core::error::Error for ContextError {}
