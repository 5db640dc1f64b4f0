//! The traversal context: a stack of levels, one per open property.
//!
//! # Swaps
//!
//! [`Context::register_swap`] files a swap under the innermost open level.
//! [`Context::lookup_and_mark`] searches innermost-first, so a swap declared
//! deeper in the tree shadows one declared higher up for the same class and
//! field, and the outer one becomes visible again once the inner level pops.
//! Each level checks on pop that every swap it owns was matched.
//!
//! # Cycles
//!
//! [`Context::push_level`] counts the levels on the current path equivalent to
//! the incoming property (see [`Property::is_equivalent`]). If the count
//! exceeds the property's [`Unroll`] depth the property is either terminated
//! or rejected as a [`ContextError::CyclicReference`].
//!
//! # Pairing
//!
//! Every successful push must be matched by exactly one pop.
//! [`Context::with_level`] does this for you.

use alloc::format;
use alloc::vec::Vec;

use crate::level::{Level, SwapKey};
use crate::{ClassRef, ContextError, Property, SchemaSwap, Terminator, TypeRef};
use crate::{debug, trace};

/// The property a walker should continue with after [`Context::push_level`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveProperty {
    /// Within bounds: descend into the property's type as usual.
    Open(Property),
    /// Recursion bound reached: the type was replaced by the terminator.
    /// Emit it as a leaf and do not descend.
    Terminated(Property),
    /// Recursion bound reached and the policy drops the field.
    Omitted(Property),
}

impl EffectiveProperty {
    /// The property as pushed onto the path.
    pub fn property(&self) -> &Property {
        match self {
            EffectiveProperty::Open(p)
            | EffectiveProperty::Terminated(p)
            | EffectiveProperty::Omitted(p) => p,
        }
    }

    /// Whether the walker may descend into this property's type.
    pub fn is_open(&self) -> bool {
        matches!(self, EffectiveProperty::Open(_))
    }
}

/// Scoped swap registry and cycle detector for one schema-generation run.
///
/// Not meant to be shared: build a fresh context for every root type.
#[derive(Debug)]
pub struct Context {
    hierarchy: Vec<Level>,
}

impl Context {
    /// Start a walk from `root`. The root level is open until [`Context::close`].
    pub fn new(root: TypeRef) -> Self {
        trace!("opening schema context for {root}");
        Self {
            hierarchy: alloc::vec![Level::new(Property::root(root))],
        }
    }

    /// Number of open levels, root included.
    pub fn depth(&self) -> usize {
        self.hierarchy.len()
    }

    /// The open path, root first.
    pub fn path(&self) -> impl Iterator<Item = &Property> {
        self.hierarchy.iter().map(|level| &level.property)
    }

    /// Register `swap`, declared on `declared_on`, in the innermost open level.
    ///
    /// Fails if that level already holds a swap for the same class and field.
    /// Swaps for the same key at different levels are fine: the inner one
    /// shadows the outer one.
    pub fn register_swap(
        &mut self,
        declared_on: &ClassRef,
        swap: SchemaSwap,
    ) -> Result<(), ContextError> {
        let level = self.innermost_mut()?;
        trace!("registering {swap} on {declared_on} at {level}");
        level
            .add_swap(swap, declared_on.clone())
            .map_err(|(swap, existing)| ContextError::Conflict {
                declared_on: declared_on.clone(),
                swap,
                existing,
            })
    }

    /// Find the innermost swap for `original.field`, marking it used.
    pub fn lookup_and_mark(&mut self, original: &ClassRef, field: &str) -> Option<SchemaSwap> {
        let key = SwapKey::new(original, field);
        let found = self
            .hierarchy
            .iter_mut()
            .rev()
            .find_map(|level| level.mark(&key))
            .cloned();
        if let Some(swap) = &found {
            trace!("matched {swap}");
        }
        found
    }

    /// Open a level for `property`.
    ///
    /// Returns the property the walker should continue with: unchanged while
    /// within its unroll bound, terminated or omitted once past it. In every
    /// `Ok` case a level was pushed and must be popped.
    pub fn push_level(&mut self, property: Property) -> Result<EffectiveProperty, ContextError> {
        let count = self
            .hierarchy
            .iter()
            .filter(|level| level.has_equivalent(&property))
            .count();
        let allowed = property
            .unroll
            .as_ref()
            .map_or(0, |unroll| usize::try_from(unroll.depth).unwrap_or(0));

        let effective = if count > allowed {
            self.terminate_or_fail(property)?
        } else {
            EffectiveProperty::Open(property)
        };

        trace!(
            "push level {} (depth {})",
            effective.property(),
            self.hierarchy.len()
        );
        self.hierarchy.push(Level::new(effective.property().clone()));
        Ok(effective)
    }

    fn terminate_or_fail(&self, property: Property) -> Result<EffectiveProperty, ContextError> {
        let terminator = match &property.unroll {
            Some(unroll) if unroll.is_defined() => unroll.terminator.clone(),
            _ => {
                debug!("cyclic reference at {property}");
                return Err(ContextError::CyclicReference {
                    path: self.path().cloned().collect(),
                    property,
                });
            }
        };

        Ok(match terminator {
            Terminator::Type(ty) => {
                trace!("terminating {property} with {ty}");
                EffectiveProperty::Terminated(Property { ty, ..property })
            }
            Terminator::Omit => {
                trace!("omitting {property}");
                EffectiveProperty::Omitted(property)
            }
        })
    }

    /// Close the innermost level, failing if any swap it owns went unmatched.
    ///
    /// The root level can only be closed through [`Context::close`].
    pub fn pop_level(&mut self) -> Result<(), ContextError> {
        if self.hierarchy.len() <= 1 {
            return Err(ContextError::InternalInvariant {
                reason: format!(
                    "pop_level called with {} open levels; the root level is closed by close()",
                    self.hierarchy.len()
                ),
            });
        }
        self.pop_validated()
    }

    fn pop_validated(&mut self) -> Result<(), ContextError> {
        let Some(level) = self.hierarchy.pop() else {
            return Err(ContextError::InternalInvariant {
                reason: "no open level to pop".into(),
            });
        };
        trace!("pop level {level}");
        let unmatched = level.unmatched();
        if unmatched.is_empty() {
            Ok(())
        } else {
            debug!("{} unmatched swap(s) at {level}", unmatched.len());
            Err(ContextError::UnmatchedSwaps { swaps: unmatched })
        }
    }

    /// Run `f` with a level open for `property`, and close it afterwards.
    ///
    /// On success the level is popped and its swaps validated; a validation
    /// failure replaces the result. If `f` fails, the level (and anything `f`
    /// left open above it) is discarded without validating its swaps, and
    /// `f`'s error is returned.
    pub fn with_level<T, E>(
        &mut self,
        property: Property,
        f: impl FnOnce(&mut Self, &EffectiveProperty) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<ContextError>,
    {
        let effective = self.push_level(property)?;
        let depth = self.hierarchy.len();
        match f(self, &effective) {
            Ok(_) if self.hierarchy.len() != depth => {
                let found = self.hierarchy.len();
                self.hierarchy.truncate(depth - 1);
                Err(ContextError::InternalInvariant {
                    reason: format!(
                        "level {} left {found} open levels, expected {depth}",
                        effective.property()
                    ),
                }
                .into())
            }
            Ok(value) => {
                self.pop_level()?;
                Ok(value)
            }
            Err(err) => {
                trace!("unwinding level {}", effective.property());
                self.hierarchy.truncate(depth - 1);
                Err(err)
            }
        }
    }

    /// Finish the walk: close the root level and check nothing is left open.
    pub fn close(mut self) -> Result<(), ContextError> {
        if self.hierarchy.len() != 1 {
            return Err(ContextError::InternalInvariant {
                reason: format!(
                    "expected only the root level at close, found {}: {}",
                    self.hierarchy.len(),
                    self.render_path()
                ),
            });
        }
        self.pop_validated()?;
        trace!("schema context closed");
        Ok(())
    }

    fn innermost_mut(&mut self) -> Result<&mut Level, ContextError> {
        self.hierarchy
            .last_mut()
            .ok_or_else(|| ContextError::InternalInvariant {
                reason: "no open level".into(),
            })
    }

    fn render_path(&self) -> alloc::string::String {
        let labels: Vec<_> = self.path().map(|p| format!("{p}")).collect();
        labels.join(" -> ")
    }
}

