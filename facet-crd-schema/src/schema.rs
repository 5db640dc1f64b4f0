use facet_schema_context::Primitive;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A structural schema, in the subset Kubernetes CRDs accept.
///
/// Unset fields are left out when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    /// The JSON type. Absent for schemas that accept anything.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<SchemaType>,

    /// Doc comment of the field or class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// For objects: the properties, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, JsonSchema>>,

    /// For objects: required property names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// For arrays: the items schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,

    /// For maps: the schema of every value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<JsonSchema>>,

    /// The value may be `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Accept fields not described by this schema.
    #[serde(
        rename = "x-kubernetes-preserve-unknown-fields",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preserve_unknown_fields: Option<bool>,
}

/// JSON type of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// Text
    String,
    /// Whole numbers
    Integer,
    /// Any JSON number
    Number,
    /// `true` / `false`
    Boolean,
    /// A list, described by `items`
    Array,
    /// A struct or map, described by `properties` or `additionalProperties`
    Object,
}

impl From<Primitive> for SchemaType {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::String => SchemaType::String,
            Primitive::Integer => SchemaType::Integer,
            Primitive::Number => SchemaType::Number,
            Primitive::Boolean => SchemaType::Boolean,
        }
    }
}

impl JsonSchema {
    /// An empty schema, accepting anything.
    pub const fn new() -> Self {
        Self {
            type_: None,
            description: None,
            properties: None,
            required: None,
            items: None,
            additional_properties: None,
            nullable: None,
            preserve_unknown_fields: None,
        }
    }

    /// A schema of the given type and nothing else.
    pub fn of_type(type_: SchemaType) -> Self {
        Self {
            type_: Some(type_),
            ..Self::new()
        }
    }

    /// An object whose contents are not described.
    pub fn opaque_object() -> Self {
        Self {
            type_: Some(SchemaType::Object),
            preserve_unknown_fields: Some(true),
            ..Self::new()
        }
    }

    /// Look up a nested property by name.
    pub fn property(&self, name: &str) -> Option<&JsonSchema> {
        self.properties.as_ref()?.get(name)
    }
}
