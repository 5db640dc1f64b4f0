use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use indexmap::IndexMap;

use crate::{ClassRef, Property, SchemaSwap};

/// Where a swap applies: the class owning the field, and the field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SwapKey {
    pub(crate) original: ClassRef,
    pub(crate) field: String,
}

impl SwapKey {
    pub(crate) fn new(original: &ClassRef, field: &str) -> Self {
        Self {
            original: original.clone(),
            field: field.into(),
        }
    }
}

/// A swap together with the class that declared it and whether a lookup has
/// matched it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSwap {
    /// The directive itself.
    pub swap: SchemaSwap,
    /// Class on which the directive was declared.
    pub declared_on: ClassRef,
    used: bool,
}

impl RegisteredSwap {
    fn new(swap: SchemaSwap, declared_on: ClassRef) -> Self {
        Self {
            swap,
            declared_on,
            used: false,
        }
    }

    /// Whether a lookup has matched this swap.
    pub fn is_used(&self) -> bool {
        self.used
    }
}

impl fmt::Display for RegisteredSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.swap, self.declared_on)
    }
}

/// One open frame of the walk: the property being visited and the swaps
/// declared while it was innermost.
#[derive(Debug)]
pub(crate) struct Level {
    pub(crate) property: Property,
    swaps: IndexMap<SwapKey, RegisteredSwap>,
}

impl Level {
    pub(crate) fn new(property: Property) -> Self {
        Self {
            property,
            swaps: IndexMap::new(),
        }
    }

    /// Insert a swap, handing back the already registered one on a key clash.
    /// The existing entry is left in place.
    pub(crate) fn add_swap(
        &mut self,
        swap: SchemaSwap,
        declared_on: ClassRef,
    ) -> Result<(), (RegisteredSwap, RegisteredSwap)> {
        let key = SwapKey::new(&swap.original, &swap.field);
        let value = RegisteredSwap::new(swap, declared_on);
        match self.swaps.get(&key) {
            Some(existing) => Err((value, existing.clone())),
            None => {
                self.swaps.insert(key, value);
                Ok(())
            }
        }
    }

    pub(crate) fn mark(&mut self, key: &SwapKey) -> Option<&SchemaSwap> {
        let value = self.swaps.get_mut(key)?;
        value.used = true;
        Some(&value.swap)
    }

    /// Swaps registered here that no lookup ever matched, in registration order.
    pub(crate) fn unmatched(&self) -> Vec<RegisteredSwap> {
        self.swaps.values().filter(|v| !v.used).cloned().collect()
    }

    pub(crate) fn has_equivalent(&self, property: &Property) -> bool {
        self.property.is_equivalent(property)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.property)
    }
}
