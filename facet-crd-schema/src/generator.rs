//! Recursive-descent schema generation over a [`TypeModel`].
//!
//! For every class reached, the generator first registers the swaps the class
//! declares, then visits its fields in order. Each field is looked up against
//! the open swaps, and walked inside its own context level so that cycles are
//! caught and swaps declared beneath it are checked when it closes. A class
//! that stands for a list or map is walked as that container, inside a level
//! of its own.

use facet_schema_context::{
    ClassRef, Context, EffectiveProperty, Property, SwapTarget, TypeRef,
};
use indexmap::IndexMap;

use crate::{JsonSchema, ModelError, SchemaError, SchemaType, TypeModel};
use crate::{debug, trace};

/// Knobs for the emitted schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Emit `x-kubernetes-preserve-unknown-fields: true` for raw JSON values.
    /// When off, raw values get an empty schema.
    pub preserve_unknown_fields_for_raw: bool,

    /// Emit `nullable: true` for optional types.
    pub nullable_optionals: bool,

    /// Copy field and class docs into `description`.
    pub descriptions: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            preserve_unknown_fields_for_raw: true,
            nullable_optionals: true,
            descriptions: true,
        }
    }
}

impl GeneratorOptions {
    /// Set [`GeneratorOptions::preserve_unknown_fields_for_raw`].
    pub fn preserve_unknown_fields_for_raw(mut self, enabled: bool) -> Self {
        self.preserve_unknown_fields_for_raw = enabled;
        self
    }

    /// Set [`GeneratorOptions::nullable_optionals`].
    pub fn nullable_optionals(mut self, enabled: bool) -> Self {
        self.nullable_optionals = enabled;
        self
    }

    /// Set [`GeneratorOptions::descriptions`].
    pub fn descriptions(mut self, enabled: bool) -> Self {
        self.descriptions = enabled;
        self
    }
}

/// Generates structural schemas for classes of one [`TypeModel`].
#[derive(Debug, Clone)]
pub struct SchemaGenerator<'m> {
    model: &'m TypeModel,
    options: GeneratorOptions,
}

impl<'m> SchemaGenerator<'m> {
    /// A generator with default options.
    pub fn new(model: &'m TypeModel) -> Self {
        Self {
            model,
            options: GeneratorOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate the schema rooted at `root`.
    ///
    /// Every call walks with a fresh [`Context`]; a failure leaves nothing
    /// behind for the next call.
    pub fn generate(&self, root: &ClassRef) -> Result<JsonSchema, SchemaError> {
        debug!("generating schema for {root}");
        let root_ty = TypeRef::Class(root.clone());
        let mut ctx = Context::new(root_ty.clone());
        let schema = self.schema_for_type(&mut ctx, &root_ty)?;
        ctx.close()?;
        Ok(schema)
    }

    fn schema_for_type(&self, ctx: &mut Context, ty: &TypeRef) -> Result<JsonSchema, SchemaError> {
        Ok(match ty {
            TypeRef::Primitive(primitive) => JsonSchema::of_type((*primitive).into()),
            TypeRef::Raw => self.raw_schema(),
            TypeRef::List(inner) => JsonSchema {
                type_: Some(SchemaType::Array),
                items: Some(Box::new(self.schema_for_type(ctx, inner)?)),
                ..JsonSchema::new()
            },
            TypeRef::Map(inner) => JsonSchema {
                type_: Some(SchemaType::Object),
                additional_properties: Some(Box::new(self.schema_for_type(ctx, inner)?)),
                ..JsonSchema::new()
            },
            TypeRef::Optional(inner) => self.nullable(self.schema_for_type(ctx, inner)?),
            TypeRef::Class(class) => self.schema_for_class(ctx, class)?,
            TypeRef::Param(param) => {
                return Err(ModelError::UnboundParam {
                    param: param.clone(),
                    class: ctx
                        .path()
                        .last()
                        .and_then(|p| p.declaring.as_ref())
                        .map_or_else(String::new, ToString::to_string),
                }
                .into());
            }
        })
    }

    /// Schema for a terminator: rendered in full when it has nothing to
    /// descend into, as an opaque object otherwise.
    fn leaf_schema(&self, ctx: &mut Context, ty: &TypeRef) -> Result<JsonSchema, SchemaError> {
        match ty {
            TypeRef::Optional(inner) => Ok(self.nullable(self.leaf_schema(ctx, inner)?)),
            ty if ty.has_children() => Ok(JsonSchema::opaque_object()),
            ty => self.schema_for_type(ctx, ty),
        }
    }

    fn schema_for_class(
        &self,
        ctx: &mut Context,
        class: &ClassRef,
    ) -> Result<JsonSchema, SchemaError> {
        let resolved = self.model.resolve(class)?;
        for swap in &resolved.swaps {
            ctx.register_swap(class, swap.clone())?;
        }

        if let Some(container) = resolved.container {
            trace!("{class} stands for {container}");
            // No unroll policy: the level is either open or the push fails, so
            // a class that contains itself is reported as a cycle.
            let element = Property::new(class.clone(), "", container);
            let schema = ctx.with_level(element, |ctx, effective| {
                self.schema_for_type(ctx, &effective.property().ty)
            })?;
            return Ok(JsonSchema {
                description: resolved.doc.filter(|_| self.options.descriptions),
                ..schema
            });
        }

        let mut properties = IndexMap::new();
        let mut required = Vec::new();

        for field in &resolved.fields {
            let mut property = Property::new(class.clone(), field.name.as_str(), field.ty.clone())
                .with_unroll(field.unroll.clone());

            if let Some(swap) = ctx.lookup_and_mark(class, &field.name) {
                match swap.target {
                    SwapTarget::Type(ty) => property.ty = ty,
                    SwapTarget::Ignore => {
                        trace!("{class}.{} ignored by swap", field.name);
                        continue;
                    }
                    SwapTarget::Keep => {}
                }
                if swap.unroll.is_some() {
                    property.unroll = swap.unroll;
                }
            }

            let schema = ctx.with_level(property, |ctx, effective| match effective {
                EffectiveProperty::Open(p) => self.schema_for_type(ctx, &p.ty).map(Some),
                EffectiveProperty::Terminated(p) => self.leaf_schema(ctx, &p.ty).map(Some),
                EffectiveProperty::Omitted(_) => Ok(None),
            })?;
            let Some(mut schema) = schema else {
                continue;
            };

            if self.options.descriptions && field.doc.is_some() {
                schema.description = field.doc.clone();
            }
            if field.required {
                required.push(field.name.clone());
            }
            properties.insert(field.name.clone(), schema);
        }

        Ok(JsonSchema {
            type_: Some(SchemaType::Object),
            description: resolved.doc.filter(|_| self.options.descriptions),
            properties: Some(properties),
            required: (!required.is_empty()).then_some(required),
            ..JsonSchema::new()
        })
    }

    fn raw_schema(&self) -> JsonSchema {
        if self.options.preserve_unknown_fields_for_raw {
            JsonSchema {
                preserve_unknown_fields: Some(true),
                ..JsonSchema::new()
            }
        } else {
            JsonSchema::new()
        }
    }

    fn nullable(&self, schema: JsonSchema) -> JsonSchema {
        if self.options.nullable_optionals {
            JsonSchema {
                nullable: Some(true),
                ..schema
            }
        } else {
            schema
        }
    }
}
