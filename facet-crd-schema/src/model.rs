//! A declarative type model: named classes with fields, generic parameters,
//! a superclass, and the schema swaps they declare.
//!
//! [`TypeModel::resolve`] turns a [`ClassRef`] into the flat, fully
//! substituted field list the generator walks. A class whose supertype chain
//! ends in a list or map stands for that container instead:
//!
//! ```text
//! MultiMap<K, V>                    extends Map<List<V>>
//! StringIntegerMultiMap             extends MultiMap<string, integer>
//! ```
//!
//! resolves `StringIntegerMultiMap` to `Map<List<integer>>`.

use std::collections::HashMap;

use facet_schema_context::{ClassRef, SchemaSwap, SwapTarget, TypeRef, Unroll};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// A field declared on a [`ClassDef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as it appears in the schema.
    pub name: String,

    /// Declared type; may mention the class's generic parameters.
    pub ty: TypeRef,

    /// Listed under `required` in the emitted schema.
    #[serde(default)]
    pub required: bool,

    /// Recursion policy for this field.
    #[serde(default)]
    pub unroll: Option<Unroll>,

    /// Emitted as the property's `description`.
    #[serde(default)]
    pub doc: Option<String>,
}

impl FieldDef {
    /// An optional, undocumented field.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            unroll: None,
            doc: None,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Bound the field's recursion.
    pub fn unroll(mut self, unroll: Unroll) -> Self {
        self.unroll = Some(unroll);
        self
    }

    /// Attach a description.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Unique name within the model.
    pub name: String,

    /// Generic parameter names, bound positionally by [`ClassRef::args`].
    #[serde(default)]
    pub params: Vec<String>,

    /// Supertype. A class inherits its fields; a list or map makes this
    /// class stand for that container. May mention `params`.
    #[serde(default)]
    pub extends: Option<TypeRef>,

    /// Own fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,

    /// Swaps declared on this class. They apply to everything reached while
    /// this class is being generated.
    #[serde(default)]
    pub swaps: Vec<SchemaSwap>,

    /// Emitted as the object's `description`.
    #[serde(default)]
    pub doc: Option<String>,
}

impl ClassDef {
    /// An empty, non-generic class.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            extends: None,
            fields: Vec::new(),
            swaps: Vec::new(),
            doc: None,
        }
    }

    /// Add a generic parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Inherit from `parent`, a class or a container type.
    pub fn extends(mut self, parent: impl Into<TypeRef>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Add a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a swap.
    pub fn swap(mut self, swap: SchemaSwap) -> Self {
        self.swaps.push(swap);
        self
    }

    /// Attach a description.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A class with generics bound and inherited fields flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClass {
    /// The class as referenced.
    pub class: ClassRef,

    /// Inherited fields first, then own fields. A field redeclared by a
    /// subclass keeps the position of the inherited one. Empty when
    /// `container` is set.
    pub fields: Vec<FieldDef>,

    /// The list or map this class stands for, generics bound through the
    /// whole supertype chain.
    pub container: Option<TypeRef>,

    /// Swaps declared on the class itself, with generics substituted.
    pub swaps: Vec<SchemaSwap>,

    /// The class's description.
    pub doc: Option<String>,
}

/// On-disk form of a [`TypeModel`].
#[derive(Debug, Deserialize)]
struct ModelDocument {
    classes: Vec<ClassDef>,
}

/// A set of class declarations, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    classes: IndexMap<String, ClassDef>,
}

type Bindings<'a> = HashMap<&'a str, &'a TypeRef>;

impl TypeModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from declarations, rejecting duplicate names.
    pub fn from_classes(classes: impl IntoIterator<Item = ClassDef>) -> Result<Self, ModelError> {
        let mut model = Self::new();
        for class in classes {
            model.insert(class)?;
        }
        Ok(model)
    }

    /// Load a model from a JSON document of the form `{"classes": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let document: ModelDocument = serde_json::from_str(json).map_err(ModelError::Parse)?;
        Self::from_classes(document.classes)
    }

    /// Add a class declaration.
    pub fn insert(&mut self, class: ClassDef) -> Result<(), ModelError> {
        if self.classes.contains_key(&class.name) {
            return Err(ModelError::DuplicateClass { name: class.name });
        }
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    /// Number of declared classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is declared.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Bind `class`'s generic arguments and flatten its inherited fields.
    pub fn resolve(&self, class: &ClassRef) -> Result<ResolvedClass, ModelError> {
        let def = self.lookup(class)?;
        let bindings = bind(def, class)?;

        let mut fields = IndexMap::new();
        let mut chain = Vec::new();
        let container = self.collect_fields(class, &mut fields, &mut chain)?;

        let swaps = def
            .swaps
            .iter()
            .map(|swap| substitute_swap(swap, &bindings, &def.name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedClass {
            class: class.clone(),
            fields: fields.into_values().collect(),
            container,
            swaps,
            doc: def.doc.clone(),
        })
    }

    fn lookup(&self, class: &ClassRef) -> Result<&ClassDef, ModelError> {
        self.classes
            .get(&class.name)
            .ok_or_else(|| ModelError::UnknownClass {
                name: class.name.clone(),
            })
    }

    /// Collect fields along the supertype chain, or stop at the first
    /// container supertype and return it.
    fn collect_fields(
        &self,
        class: &ClassRef,
        out: &mut IndexMap<String, FieldDef>,
        chain: &mut Vec<String>,
    ) -> Result<Option<TypeRef>, ModelError> {
        if chain.contains(&class.name) {
            let mut chain = chain.clone();
            chain.push(class.name.clone());
            return Err(ModelError::InheritanceCycle { chain });
        }
        chain.push(class.name.clone());

        let def = self.lookup(class)?;
        let bindings = bind(def, class)?;

        if let Some(parent) = &def.extends {
            let parent = substitute(parent, &bindings, &def.name)?;
            if let Some(parent) = parent.as_class() {
                let container = self.collect_fields(parent, out, chain)?;
                if container.is_some() {
                    return Ok(container);
                }
            } else if matches!(parent, TypeRef::List(_) | TypeRef::Map(_)) {
                return Ok(Some(parent));
            } else {
                return Err(ModelError::InvalidSupertype {
                    class: def.name.clone(),
                    supertype: parent,
                });
            }
        }

        for field in &def.fields {
            let ty = substitute(&field.ty, &bindings, &def.name)?;
            out.insert(
                field.name.clone(),
                FieldDef {
                    ty,
                    ..field.clone()
                },
            );
        }
        Ok(None)
    }
}

fn bind<'a>(def: &'a ClassDef, class: &'a ClassRef) -> Result<Bindings<'a>, ModelError> {
    if def.params.len() != class.args.len() {
        return Err(ModelError::ArityMismatch {
            class: def.name.clone(),
            expected: def.params.len(),
            found: class.args.len(),
        });
    }
    Ok(def
        .params
        .iter()
        .map(String::as_str)
        .zip(class.args.iter())
        .collect())
}

fn substitute(ty: &TypeRef, bindings: &Bindings<'_>, owner: &str) -> Result<TypeRef, ModelError> {
    Ok(match ty {
        TypeRef::Param(name) => match bindings.get(name.as_str()) {
            Some(bound) => (*bound).clone(),
            None => {
                return Err(ModelError::UnboundParam {
                    param: name.clone(),
                    class: owner.into(),
                });
            }
        },
        TypeRef::Class(class) => TypeRef::Class(substitute_class(class, bindings, owner)?),
        TypeRef::List(inner) => TypeRef::list(substitute(inner, bindings, owner)?),
        TypeRef::Map(inner) => TypeRef::map(substitute(inner, bindings, owner)?),
        TypeRef::Optional(inner) => TypeRef::optional(substitute(inner, bindings, owner)?),
        TypeRef::Primitive(_) | TypeRef::Raw => ty.clone(),
    })
}

fn substitute_class(
    class: &ClassRef,
    bindings: &Bindings<'_>,
    owner: &str,
) -> Result<ClassRef, ModelError> {
    let args = class
        .args
        .iter()
        .map(|arg| substitute(arg, bindings, owner))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ClassRef {
        name: class.name.clone(),
        args,
    })
}

fn substitute_swap(
    swap: &SchemaSwap,
    bindings: &Bindings<'_>,
    owner: &str,
) -> Result<SchemaSwap, ModelError> {
    let target = match &swap.target {
        SwapTarget::Type(ty) => SwapTarget::Type(substitute(ty, bindings, owner)?),
        other => other.clone(),
    };
    Ok(SchemaSwap {
        original: substitute_class(&swap.original, bindings, owner)?,
        field: swap.field.clone(),
        target,
        unroll: swap.unroll.clone(),
    })
}
