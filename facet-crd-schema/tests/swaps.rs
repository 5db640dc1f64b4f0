//! Schema swaps declared on classes: scoping, shadowing and validation.

mod common;

use common::{at, class, joker_model};
use facet_crd_schema::{
    ClassDef, ContextError, FieldDef, JsonSchema, SchemaError, SchemaSwap, SchemaType, TypeModel,
    TypeRef, schema_for,
};
use serde_json::json;

fn joker_at<'s>(schema: &'s JsonSchema, prop: &str) -> &'s JsonSchema {
    at(schema, &[prop, "myObject", "joker"])
}

#[test]
fn nested_swap_shadows_the_top_level_one() {
    common::setup();

    let model = joker_model(vec![SchemaSwap::replace(
        class("Joker"),
        "joker",
        TypeRef::STRING,
    )]);
    let schema = schema_for(&model, &class("Spec")).unwrap();

    let string = JsonSchema::of_type(SchemaType::String);
    for prop in ["prop1", "prop2", "prop4", "prop5"] {
        assert_eq!(joker_at(&schema, prop), &string, "{prop}");
    }
    assert_eq!(
        serde_json::to_value(at(&schema, &["prop3"])).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "myObject": {
                    "type": "object",
                    "properties": {
                        "joker": { "x-kubernetes-preserve-unknown-fields": true }
                    }
                }
            }
        })
    );
}

#[test]
fn nested_swap_alone_only_affects_its_subtree() {
    common::setup();

    let model = joker_model(vec![]);
    let schema = schema_for(&model, &class("Spec")).unwrap();

    let integer = JsonSchema::of_type(SchemaType::Integer);
    for prop in ["prop1", "prop2", "prop4", "prop5"] {
        assert_eq!(joker_at(&schema, prop), &integer, "{prop}");
    }
    assert_eq!(joker_at(&schema, "prop3").preserve_unknown_fields, Some(true));
}

#[test]
fn top_level_swap_that_never_matches_fails() {
    common::setup();

    let model = joker_model(vec![SchemaSwap::replace(
        class("Joker"),
        "nope",
        TypeRef::STRING,
    )]);
    let err = schema_for(&model, &class("Spec")).unwrap_err();
    match &err {
        SchemaError::Context(ContextError::UnmatchedSwaps { swaps }) => {
            assert_eq!(swaps.len(), 1);
            assert_eq!(swaps[0].declared_on, class("Spec"));
        }
        other => panic!("expected unmatched swaps, got {other:?}"),
    }
    insta::assert_snapshot!(err.to_string(), @"unmatched schema swaps: swap(Joker.nope -> string) on Spec");
}

#[test]
fn nested_swap_that_never_matches_fails_when_its_subtree_closes() {
    common::setup();

    let model = TypeModel::from_classes([
        ClassDef::new("Spec")
            .field(FieldDef::new("outer", TypeRef::class("Outer")))
            .field(FieldDef::new("joker", TypeRef::class("Joker"))),
        // The swap would match `Spec.joker`, but that is outside `Outer`.
        ClassDef::new("Outer")
            .field(FieldDef::new("name", TypeRef::STRING))
            .swap(SchemaSwap::replace(class("Joker"), "joker", TypeRef::Raw)),
        ClassDef::new("Joker").field(FieldDef::new("joker", TypeRef::INTEGER)),
    ])
    .unwrap();

    let err = schema_for(&model, &class("Spec")).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"unmatched schema swaps: swap(Joker.joker -> RawJson) on Outer");
}

#[test]
fn duplicate_swaps_on_one_class_conflict() {
    common::setup();

    let model = joker_model(vec![
        SchemaSwap::replace(class("Joker"), "joker", TypeRef::STRING),
        SchemaSwap::replace(class("Joker"), "joker", TypeRef::Raw),
    ]);
    let err = schema_for(&model, &class("Spec")).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::Context(ContextError::Conflict { .. })
    ));
    insta::assert_snapshot!(err.to_string(), @"conflicting schema swaps on Spec: swap(Joker.joker -> RawJson) on Spec vs. swap(Joker.joker -> string) on Spec");
}

#[test]
fn ignore_swap_drops_the_field() {
    common::setup();

    let model = joker_model(vec![SchemaSwap::ignore(class("Joker"), "joker")]);
    let schema = schema_for(&model, &class("Spec")).unwrap();

    let joker = at(&schema, &["prop1", "myObject"]);
    assert_eq!(joker.properties.as_ref().map(|p| p.len()), Some(0));
    assert!(joker_at(&schema, "prop3").preserve_unknown_fields.is_some());
}

#[test]
fn swap_to_a_class_descends_into_the_replacement() {
    common::setup();

    let model = TypeModel::from_classes([
        ClassDef::new("Spec")
            .field(FieldDef::new("joker", TypeRef::class("Joker")))
            .swap(SchemaSwap::replace(
                class("Joker"),
                "joker",
                TypeRef::list(TypeRef::class("Card")),
            )),
        ClassDef::new("Joker").field(FieldDef::new("joker", TypeRef::INTEGER)),
        ClassDef::new("Card")
            .field(FieldDef::new("suit", TypeRef::STRING).required())
            .swap(SchemaSwap::replace(class("Card"), "suit", TypeRef::BOOLEAN)),
    ])
    .unwrap();

    let schema = schema_for(&model, &class("Spec")).unwrap();
    assert_eq!(
        serde_json::to_value(at(&schema, &["joker", "joker"])).unwrap(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": { "suit": { "type": "boolean" } },
                "required": ["suit"]
            }
        })
    );
}

#[test]
fn swaps_on_generic_classes_are_substituted() {
    common::setup();

    let model = TypeModel::from_classes([
        ClassDef::new("Spec").field(FieldDef::new(
            "holder",
            TypeRef::Class(facet_crd_schema::ClassRef::generic(
                "Holder",
                [TypeRef::class("Joker")],
            )),
        )),
        ClassDef::new("Holder")
            .param("T")
            .field(FieldDef::new("value", TypeRef::param("T")))
            .swap(SchemaSwap::replace(
                facet_crd_schema::ClassRef::generic("Holder", [TypeRef::param("T")]),
                "value",
                TypeRef::list(TypeRef::param("T")),
            )),
        ClassDef::new("Joker").field(FieldDef::new("joker", TypeRef::INTEGER)),
    ])
    .unwrap();

    let schema = schema_for(&model, &class("Spec")).unwrap();
    assert_eq!(
        at(&schema, &["holder", "value", "[]", "joker"]),
        &JsonSchema::of_type(SchemaType::Integer)
    );
}
