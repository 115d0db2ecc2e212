//! Set transformer
//!
//! A set is an array with unique elements. The value runs through the
//! array pipeline first (loader composition); the default `autoCast` then
//! deduplicates, first occurrence winning.

use serde_json::{json, Map, Value};

use super::{violation, Transformer};
use crate::schema::{ParseResult, Schema, Settings};

pub struct SetTransformer;

impl Transformer for SetTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("autoCast".into(), json!(true));
        defaults.insert("typeError".into(), json!("Invalid set"));
        defaults.insert("uniqueError".into(), json!("Set values must be unique"));
        defaults
    }

    fn loaders(&self) -> Vec<Value> {
        vec![json!("array")]
    }

    fn cast(&self, value: Value, _node: &Schema, _settings: &Settings) -> Value {
        match value {
            Value::Array(items) => {
                let mut unique: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Value::Array(unique)
            }
            other => other,
        }
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        let items = match value.as_array() {
            Some(items) => items,
            None => return Err(violation(node, settings, "typeError", "Invalid set", value, &[])),
        };
        for (index, item) in items.iter().enumerate() {
            if items[..index].contains(item) {
                return Err(violation(
                    node,
                    settings,
                    "uniqueError",
                    "Set values must be unique",
                    value,
                    &[],
                ));
            }
        }
        Ok(())
    }
}
