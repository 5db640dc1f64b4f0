use core::fmt;

use facet_schema_context::{ContextError, TypeRef};

/// A type model that cannot be resolved.
#[derive(Debug)]
pub enum ModelError {
    /// A class was referenced but never declared.
    UnknownClass {
        /// The missing name.
        name: String,
    },

    /// A class reference supplies the wrong number of generic arguments.
    ArityMismatch {
        /// The generic class.
        class: String,
        /// Number of declared parameters.
        expected: usize,
        /// Number of arguments supplied.
        found: usize,
    },

    /// A generic parameter is used where nothing binds it.
    UnboundParam {
        /// The parameter name.
        param: String,
        /// The class whose declaration mentions it.
        class: String,
    },

    /// A class inherits from itself, directly or through other classes.
    InheritanceCycle {
        /// Class names from the starting class back to the repeated one.
        chain: Vec<String>,
    },

    /// A class extends something that is neither a class, a list nor a map.
    InvalidSupertype {
        /// The extending class.
        class: String,
        /// The supertype, generics substituted.
        supertype: TypeRef,
    },

    /// Two declarations share a name.
    DuplicateClass {
        /// The duplicated name.
        name: String,
    },

    /// The model document is not valid JSON or does not match the expected shape.
    Parse(serde_json::Error),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownClass { name } => write!(f, "unknown class `{name}`"),
            ModelError::ArityMismatch {
                class,
                expected,
                found,
            } => {
                write!(
                    f,
                    "class `{class}` takes {expected} generic argument(s), {found} supplied"
                )
            }
            ModelError::UnboundParam { param, class } => {
                write!(f, "generic parameter `{param}` is not bound in `{class}`")
            }
            ModelError::InheritanceCycle { chain } => {
                write!(f, "inheritance cycle: {}", chain.join(" extends "))
            }
            ModelError::InvalidSupertype { class, supertype } => {
                write!(f, "class `{class}` cannot extend `{supertype}`")
            }
            ModelError::DuplicateClass { name } => {
                write!(f, "class `{name}` is declared more than once")
            }
            ModelError::Parse(err) => write!(f, "invalid type model: {err}"),
        }
    }
}

impl core::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ModelError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Why a schema could not be generated.
#[derive(Debug)]
pub enum SchemaError {
    /// The walk broke a swap or recursion rule.
    Context(ContextError),
    /// The type model could not be resolved.
    Model(ModelError),
    /// The finished schema could not be serialized.
    Serialize(serde_json::Error),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Context(err) => write!(f, "{err}"),
            SchemaError::Model(err) => write!(f, "{err}"),
            SchemaError::Serialize(err) => write!(f, "failed to serialize schema: {err}"),
        }
    }
}

impl core::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            SchemaError::Context(err) => Some(err),
            SchemaError::Model(err) => Some(err),
            SchemaError::Serialize(err) => Some(err),
        }
    }
}

impl From<ContextError> for SchemaError {
    fn from(err: ContextError) -> Self {
        SchemaError::Context(err)
    }
}

impl From<ModelError> for SchemaError {
    fn from(err: ModelError) -> Self {
        SchemaError::Model(err)
    }
}
