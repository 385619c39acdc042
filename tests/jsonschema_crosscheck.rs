//! Cross-checks generated schemas against the `jsonschema` crate
//!
//! The wire form should mean the same thing to a third-party validator as it
//! does to ours, at least for the keyword subset we emit.

mod common;

use jsonschema::{Draft, JSONSchema};
use planning_schemas::{generate_example, generate_field_schema, validate, Field, SchemaBuilder};
use serde_json::{json, Value};

fn compile(schema: &Value) -> JSONSchema {
    let mut schema = schema.clone();
    // Pin the draft explicitly rather than relying on `$schema` detection
    schema.as_object_mut().unwrap().remove("$schema");
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .expect("generated schema compiles")
}

#[test]
fn test_wire_schema_compiles() {
    let store = common::store();
    let builder = SchemaBuilder::new(&store);
    for app in store.application_types() {
        let schema = builder.schema_for(&app.reference).unwrap();
        compile(&schema.to_value());
    }
}

#[test]
fn test_both_validators_accept_complete_payload() {
    let store = common::store();
    let schema = SchemaBuilder::new(&store).schema_for("hh").unwrap();
    let payload = common::householder_payload();

    assert!(validate(&payload, &schema).is_valid());
    assert!(compile(&schema.to_value()).is_valid(&payload));
}

#[test]
fn test_both_validators_accept_example() {
    let store = common::store();
    let schema = SchemaBuilder::new(&store).schema_for("ldc").unwrap();
    let example = generate_example(&schema);

    assert!(validate(&example, &schema).is_valid());
    assert!(compile(&schema.to_value()).is_valid(&example));
}

#[test]
fn test_both_validators_reject() {
    let store = common::store();
    let schema = SchemaBuilder::new(&store).schema_for("hh").unwrap();
    let compiled = compile(&schema.to_value());

    let mut empty_types = common::householder_payload();
    empty_types["application-types"] = json!([]);
    let mut extra = common::householder_payload();
    extra["extra-field"] = json!(1);
    let mut missing = common::householder_payload();
    missing.as_object_mut().unwrap().remove("documents");

    for payload in [empty_types, extra, missing] {
        assert!(!validate(&payload, &schema).is_valid());
        assert!(!compiled.is_valid(&payload));
    }
}

#[test]
fn test_look_ahead_rule_agrees() {
    let field = Field::new("site-reference", "string").with_rule("must match pattern /^(?!TEST).+$/");
    let schema = generate_field_schema(&field);
    let compiled = compile(&schema.to_value());

    for (value, expected) in [(json!("LIVE-1"), true), (json!("TEST-1"), false)] {
        assert_eq!(validate(&value, &schema).is_valid(), expected, "{}", value);
        assert_eq!(compiled.is_valid(&value), expected, "{}", value);
    }
}
