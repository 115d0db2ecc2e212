//! Arbitrary-precision integer transformer
//!
//! Values beyond the range JSON numbers can carry faithfully travel as
//! digit strings; JSON integers are accepted as-is. `autoCast`
//! canonicalizes integers to their digit-string form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::{violation, Transformer};
use crate::schema::{ParseResult, Schema, Settings};

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("bigint pattern"));

pub struct BigintTransformer;

impl Transformer for BigintTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("typeError".into(), json!("Invalid bigint"));
        defaults
    }

    fn cast(&self, value: Value, _node: &Schema, _settings: &Settings) -> Value {
        if let Value::Number(n) = &value {
            if n.is_i64() || n.is_u64() {
                return Value::String(n.to_string());
            }
        }
        value
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        let valid = match value {
            Value::String(text) => DIGITS.is_match(text),
            Value::Number(n) => n.is_i64() || n.is_u64(),
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(violation(node, settings, "typeError", "Invalid bigint", value, &[]))
        }
    }
}
