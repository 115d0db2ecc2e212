//! Transformer subsystem
//!
//! A transformer bundles one primitive type's behavior: declared default
//! settings, an optional loader pipeline, and the cast/validate/parse
//! steps the resolution engine drives. New types are data, not engine
//! logic: register a `Transformer` under a name and schemas can reference
//! it.
//!
//! # Design Principles
//!
//! - Casts are total; only validate and parse may fail
//! - Validation has no side effects beyond reporting the violation
//! - Every message is a template overridable through node settings

mod array;
mod bigint;
mod boolean;
mod date;
mod number;
mod object;
mod registry;
mod set;
mod string;

pub use array::ArrayTransformer;
pub use bigint::BigintTransformer;
pub use boolean::BooleanTransformer;
pub use date::DateTransformer;
pub use number::NumberTransformer;
pub use object::ObjectTransformer;
pub use registry::{default_registry, TransformerRegistry};
pub use set::SetTransformer;
pub use string::StringTransformer;

use serde_json::{Map, Value};

use crate::schema::{ParseCtx, ParseResult, Schema, Settings, ValidationError};
use crate::utils::render;

/// One primitive type's pluggable behavior.
pub trait Transformer: Send + Sync {
    /// Defaults merged into any node using this type, below the node's
    /// explicit settings.
    fn default_settings(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Declarative descriptions of types whose full leaf pipeline
    /// pre-processes the value before this type's own pipeline runs.
    fn loaders(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Best-effort conversion. Must be total: when conversion is not
    /// possible, return the input unchanged so the validate step reports
    /// the real failure. Only runs when `autoCast` is enabled.
    fn cast(&self, value: Value, _node: &Schema, _settings: &Settings) -> Value {
        value
    }

    /// Checks the (possibly cast) value against this type's invariants.
    fn validate(&self, _value: &Value, _node: &Schema, _settings: &Settings) -> ParseResult<()> {
        Ok(())
    }

    /// Final shaping of an already validated value, e.g. instantiating
    /// array elements against a per-item schema.
    fn parse(
        &self,
        value: Value,
        _node: &Schema,
        _settings: &Settings,
        _ctx: &ParseCtx<'_>,
    ) -> ParseResult<Value> {
        Ok(value)
    }
}

/// Renders a constraint violation from its (possibly overridden) template.
pub(crate) fn violation(
    node: &Schema,
    settings: &Settings,
    template_key: &str,
    fallback: &str,
    value: &Value,
    extras: &[(&str, String)],
) -> ValidationError {
    let mut props = node.message_props(Some(value));
    for (key, text) in extras {
        props.insert((*key).to_string(), text.clone());
    }
    let template = settings.template(template_key, fallback);
    ValidationError::new(render(template, &props))
        .with_value(value.clone())
        .with_field(node.full_path())
}
