//! Array transformer
//!
//! With an `arraySchema` option, `parse` instantiates every element
//! against the described item schema; failures carry per-index dotted
//! paths (`tags.1`). Without it, arrays pass through untouched.

use serde_json::{json, Map, Value};

use super::{violation, Transformer};
use crate::schema::{ParseCtx, ParseResult, Schema, SchemaDef, SchemaOptions, Settings, ValidationError};
use crate::utils::join_path;

pub struct ArrayTransformer;

impl Transformer for ArrayTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("typeError".into(), json!("Invalid array"));
        defaults
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        if value.is_array() {
            Ok(())
        } else {
            Err(violation(node, settings, "typeError", "Invalid array", value, &[]))
        }
    }

    fn parse(
        &self,
        value: Value,
        node: &Schema,
        settings: &Settings,
        ctx: &ParseCtx<'_>,
    ) -> ParseResult<Value> {
        let item_description = match settings.value_option("arraySchema") {
            Some(description) => description.clone(),
            None => return Ok(value),
        };
        let items = match value {
            Value::Array(items) => items,
            other => return Ok(other),
        };

        let mut sanitized = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let item_path = join_path(node.full_path(), &index.to_string());
            let item_schema = item_schema(&item_description, &item_path, ctx)?;
            if let Some(parsed) = item_schema.parse_opt(Some(item))? {
                sanitized.push(parsed);
            }
        }
        Ok(Value::Array(sanitized))
    }
}

/// Builds the per-item schema. A malformed item description surfaces as a
/// parse failure naming the item path.
fn item_schema(description: &Value, item_path: &str, ctx: &ParseCtx<'_>) -> ParseResult<Schema> {
    let def = SchemaDef::from_value(description)
        .map_err(|err| ValidationError::new(err.to_string()).with_field(item_path))?;
    Schema::with_options(
        def,
        SchemaOptions::new()
            .name(item_path)
            .registry(ctx.registry().clone()),
    )
    .map_err(|err| ValidationError::new(err.to_string()).with_field(item_path))
}
