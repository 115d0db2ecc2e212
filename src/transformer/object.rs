//! Object transformer
//!
//! A leaf object accepts any JSON object as-is; with a `mapSchema` option
//! every property value is parsed against the described schema, keeping
//! the keys free-form.

use serde_json::{json, Map, Value};

use super::{violation, Transformer};
use crate::schema::{ParseCtx, ParseResult, Schema, SchemaDef, SchemaOptions, Settings, ValidationError};
use crate::utils::join_path;

pub struct ObjectTransformer;

impl Transformer for ObjectTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("typeError".into(), json!("Invalid object"));
        defaults
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        if value.is_object() {
            Ok(())
        } else {
            Err(violation(node, settings, "typeError", "Invalid object", value, &[]))
        }
    }

    fn parse(
        &self,
        value: Value,
        node: &Schema,
        settings: &Settings,
        ctx: &ParseCtx<'_>,
    ) -> ParseResult<Value> {
        let entry_description = match settings.value_option("mapSchema") {
            Some(description) => description.clone(),
            None => return Ok(value),
        };
        let entries = match value {
            Value::Object(entries) => entries,
            other => return Ok(other),
        };

        let mut sanitized = Map::new();
        for (key, entry) in entries {
            let entry_path = join_path(node.full_path(), &key);
            let def = SchemaDef::from_value(&entry_description)
                .map_err(|err| ValidationError::new(err.to_string()).with_field(entry_path.clone()))?;
            let entry_schema = Schema::with_options(
                def,
                SchemaOptions::new()
                    .name(entry_path.clone())
                    .registry(ctx.registry().clone()),
            )
            .map_err(|err| ValidationError::new(err.to_string()).with_field(entry_path))?;
            if let Some(parsed) = entry_schema.parse_opt(Some(entry))? {
                sanitized.insert(key, parsed);
            }
        }
        Ok(Value::Object(sanitized))
    }
}
