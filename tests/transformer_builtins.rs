//! Transformer Registration Tests
//!
//! The pluggable type pipeline from a consumer's point of view:
//! - Registering a custom transformer and using it from a schema
//! - Loader pipelines composing one type out of another
//! - Settings precedence between transformer defaults and node settings

use castform::{
    ParseResult, Schema, SchemaDef, SchemaOptions, Settings, Transformer, TransformerRegistry,
    ValidationError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// An email type expressed as "string, then shape-restricted": the string
/// pipeline pre-processes the value, the transformer's own validate only
/// checks the shape.
struct EmailTransformer;

impl Transformer for EmailTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("typeError".into(), json!("Invalid email"));
        defaults
    }

    fn loaders(&self) -> Vec<Value> {
        vec![json!("string")]
    }

    fn validate(
        &self,
        value: &Value,
        node: &castform::Schema,
        _settings: &Settings,
    ) -> ParseResult<()> {
        let ok = value
            .as_str()
            .map(|text| text.contains('@') && !text.starts_with('@'))
            .unwrap_or(false);
        if ok {
            Ok(())
        } else {
            Err(ValidationError::new("Invalid email")
                .with_value(value.clone())
                .with_field(node.full_path()))
        }
    }
}

fn registry_with_email() -> Arc<TransformerRegistry> {
    let mut registry = TransformerRegistry::with_builtins();
    registry.register("email", Arc::new(EmailTransformer));
    Arc::new(registry)
}

// =============================================================================
// Custom Transformer Registration
// =============================================================================

/// A schema can reference a consumer-registered type like any built-in.
#[test]
fn test_custom_transformer_resolves() {
    let schema = Schema::with_options(
        SchemaDef::from_value(&json!({ "contact": "email" })).unwrap(),
        SchemaOptions::new().registry(registry_with_email()),
    )
    .unwrap();

    assert_eq!(
        schema.parse(json!({ "contact": "ann@example.com" })).unwrap(),
        json!({ "contact": "ann@example.com" })
    );

    let err = schema.parse(json!({ "contact": "nope" })).unwrap_err();
    assert_eq!(err.errors[0].message, "Invalid email");
}

/// Referencing an unregistered type is an authoring error, caught at
/// construction.
#[test]
fn test_unregistered_type_fails_construction() {
    let err = Schema::new(SchemaDef::of_type("email")).unwrap_err();
    assert!(err.to_string().contains("email"));
}

// =============================================================================
// Loader Pipelines
// =============================================================================

/// The loader's own pipeline runs first: a non-string input fails with
/// the string type error, not the email one.
#[test]
fn test_loader_pipeline_runs_before_target_type() {
    let schema = Schema::with_options(
        SchemaDef::of_type("email"),
        SchemaOptions::new().registry(registry_with_email()),
    )
    .unwrap();

    let err = schema.parse(json!(42)).unwrap_err();
    assert_eq!(err.message, "Invalid string");
}

/// Node-declared loaders compose declaratively too.
#[test]
fn test_node_level_loaders() {
    let schema = Schema::new(
        SchemaDef::of_type("string")
            .option("loaders", json!([{ "type": "string", "maxlength": 5 }])),
    )
    .unwrap();

    assert!(schema.parse(json!("ok")).is_ok());
    let err = schema.parse(json!("toolong")).unwrap_err();
    assert!(err.message.contains("maxlength"));
}

/// A loader naming an unknown type surfaces as a parse-time failure.
#[test]
fn test_loader_with_unknown_type_fails_at_parse() {
    let schema = Schema::new(
        SchemaDef::of_type("string").option("loaders", json!(["mystery"])),
    )
    .unwrap();

    let err = schema.parse(json!("x")).unwrap_err();
    assert!(err.message.contains("mystery"));
}

/// The built-in set composes on top of array through its loader.
#[test]
fn test_set_composes_over_array() {
    let schema = Schema::new(
        SchemaDef::from_value(&json!({ "tags": "set" })).unwrap(),
    )
    .unwrap();

    assert_eq!(
        schema.parse(json!({ "tags": ["a", "a", "b"] })).unwrap(),
        json!({ "tags": ["a", "b"] })
    );

    let err = schema.parse(json!({ "tags": "abc" })).unwrap_err();
    assert_eq!(err.errors[0].message, "Invalid array");
}

// =============================================================================
// Settings Precedence
// =============================================================================

/// Node settings override transformer defaults, which override the
/// built-in defaults.
#[test]
fn test_settings_precedence() {
    // number ships autoCast = true; the node turns it back off.
    let schema = Schema::new(
        SchemaDef::from_value(&json!({
            "strict": { "type": "number", "autoCast": false },
            "loose": { "type": "number", "required": false }
        }))
        .unwrap(),
    )
    .unwrap();

    let err = schema.parse(json!({ "strict": "42" })).unwrap_err();
    assert_eq!(err.errors[0].message, "Invalid number");

    let parsed = schema
        .parse(json!({ "strict": 1, "loose": "42" }))
        .unwrap();
    assert_eq!(parsed["loose"], json!(42));
}

// =============================================================================
// Built-in Coverage
// =============================================================================

/// Dates sanitize to canonical RFC 3339 text.
#[test]
fn test_date_sanitizes_to_rfc3339() {
    let schema = Schema::new(
        SchemaDef::from_value(&json!({ "born": "date" })).unwrap(),
    )
    .unwrap();

    let parsed = schema.parse(json!({ "born": "1999-12-31" })).unwrap();
    assert_eq!(parsed, json!({ "born": "1999-12-31T00:00:00+00:00" }));
}

/// Bigints accept digit strings wider than any JSON number.
#[test]
fn test_bigint_wide_values() {
    let schema = Schema::new(
        SchemaDef::from_value(&json!({ "balance": "bigint" })).unwrap(),
    )
    .unwrap();

    let wide = "340282366920938463463374607431768211456";
    assert_eq!(
        schema.parse(json!({ "balance": wide })).unwrap(),
        json!({ "balance": wide })
    );
    assert!(schema.parse(json!({ "balance": 1.25 })).is_err());
}

/// Arrays instantiate their items against a per-item schema.
#[test]
fn test_array_of_nested_items() {
    let schema = Schema::new(SchemaDef::of_type("array").option(
        "arraySchema",
        json!({ "name": "string", "qty": "number" }),
    ))
    .unwrap();

    let parsed = schema
        .parse(json!([
            { "name": "bolt", "qty": "3" },
            { "name": "nut", "qty": 8 }
        ]))
        .unwrap();
    assert_eq!(
        parsed,
        json!([
            { "name": "bolt", "qty": 3 },
            { "name": "nut", "qty": 8 }
        ])
    );

    let err = schema.parse(json!([{ "name": "bolt" }])).unwrap_err();
    assert!(err
        .errors
        .iter()
        .any(|sub| sub.field.as_deref() == Some("0.qty")));
}

// =============================================================================
// Error Shape
// =============================================================================

/// Validation errors serialize for embedding in API responses.
#[test]
fn test_error_shape_serializes() {
    let schema = Schema::new(
        SchemaDef::from_value(&json!({ "age": "number" })).unwrap(),
    )
    .unwrap();

    let err = schema.parse(json!({ "age": "x" })).unwrap_err();
    let encoded = serde_json::to_value(&err).unwrap();

    assert_eq!(encoded["message"], json!("Data is not valid"));
    assert_eq!(encoded["errors"][0]["field"], json!("age"));
    assert_eq!(encoded["errors"][0]["value"], json!("x"));
}
