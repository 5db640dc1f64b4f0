#![allow(dead_code)]

use std::sync::LazyLock;

use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let filter = std::env::var("FACET_LOG")
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::TRACE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Install the test subscriber once per process. Filter with `FACET_LOG`.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

use facet_crd_schema::{ClassDef, ClassRef, FieldDef, JsonSchema, SchemaSwap, TypeModel, TypeRef};

pub fn class(name: &str) -> ClassRef {
    ClassRef::new(name)
}

/// `Spec { number, ref1: Ref1, ref2: List<Ref2>, ref3: Map<Ref3> }` where each
/// `RefN` has a `number` and a field pointing back at itself through the same
/// container. `tweak` adjusts each `RefN` before it is added.
pub fn unroll_model(spec_swaps: Vec<SchemaSwap>, tweak: impl Fn(FieldDef) -> FieldDef) -> TypeModel {
    let mut spec = ClassDef::new("Spec")
        .field(FieldDef::new("number", TypeRef::INTEGER))
        .field(FieldDef::new("ref1", TypeRef::class("Ref1")))
        .field(FieldDef::new("ref2", TypeRef::list(TypeRef::class("Ref2"))))
        .field(FieldDef::new("ref3", TypeRef::map(TypeRef::class("Ref3"))));
    for swap in spec_swaps {
        spec = spec.swap(swap);
    }

    TypeModel::from_classes([
        spec,
        ClassDef::new("Ref1")
            .field(FieldDef::new("number", TypeRef::INTEGER))
            .field(tweak(FieldDef::new("ref1", TypeRef::class("Ref1")))),
        ClassDef::new("Ref2")
            .field(FieldDef::new("number", TypeRef::INTEGER))
            .field(tweak(FieldDef::new(
                "ref2",
                TypeRef::list(TypeRef::class("Ref2")),
            ))),
        ClassDef::new("Ref3")
            .field(FieldDef::new("number", TypeRef::INTEGER))
            .field(tweak(FieldDef::new(
                "ref3",
                TypeRef::map(TypeRef::class("Ref3")),
            ))),
    ])
    .unwrap()
}

/// Five containers of a `Joker`, one of which (`WithJsonNode`) swaps
/// `Joker.joker` for raw JSON.
pub fn joker_model(spec_swaps: Vec<SchemaSwap>) -> TypeModel {
    let mut spec = ClassDef::new("Spec")
        .field(FieldDef::new("prop1", TypeRef::class("WithString1")))
        .field(FieldDef::new("prop2", TypeRef::class("WithString2")))
        .field(FieldDef::new("prop3", TypeRef::class("WithJsonNode")))
        .field(FieldDef::new("prop4", TypeRef::class("WithString2")))
        .field(FieldDef::new("prop5", TypeRef::class("WithString1")));
    for swap in spec_swaps {
        spec = spec.swap(swap);
    }

    let my_object = || FieldDef::new("myObject", TypeRef::class("Joker"));
    TypeModel::from_classes([
        spec,
        ClassDef::new("WithString1").field(my_object()),
        ClassDef::new("WithString2").field(my_object()),
        ClassDef::new("WithJsonNode")
            .field(my_object())
            .swap(SchemaSwap::replace(class("Joker"), "joker", TypeRef::Raw)),
        ClassDef::new("Joker").field(FieldDef::new("joker", TypeRef::INTEGER)),
    ])
    .unwrap()
}

/// Follow `path` through nested properties, stepping into `items` and
/// `additionalProperties` transparently.
pub fn at<'s>(schema: &'s JsonSchema, path: &[&str]) -> &'s JsonSchema {
    let mut current = schema;
    for step in path {
        current = match *step {
            "[]" => current.items.as_deref().expect("no items"),
            "{}" => current
                .additional_properties
                .as_deref()
                .expect("no additionalProperties"),
            name => current
                .property(name)
                .unwrap_or_else(|| panic!("no property {name}")),
        };
    }
    current
}
