#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod error;
pub use error::{ModelError, SchemaError};

pub mod model;
pub use model::{ClassDef, FieldDef, ResolvedClass, TypeModel};

mod schema;
pub use schema::{JsonSchema, SchemaType};

pub mod generator;
pub use generator::{GeneratorOptions, SchemaGenerator};

pub use facet_schema_context::{
    ClassRef, ContextError, Primitive, SchemaSwap, SwapTarget, Terminator, TypeRef, Unroll,
};

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[macro_export]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}

/// Generate the schema rooted at `root` with default options.
pub fn schema_for(model: &TypeModel, root: &ClassRef) -> Result<JsonSchema, SchemaError> {
    SchemaGenerator::new(model).generate(root)
}

/// Generate the schema rooted at `root` as pretty-printed JSON.
pub fn to_schema(model: &TypeModel, root: &ClassRef) -> Result<String, SchemaError> {
    let schema = schema_for(model, root)?;
    serde_json::to_string_pretty(&schema).map_err(SchemaError::Serialize)
}
