//! String transformer
//!
//! Constraints: `enum`, `minlength`, `maxlength`, `regex`. Lengths count
//! characters, not bytes.

use regex::Regex;
use serde_json::{json, Map, Value};

use super::{violation, Transformer};
use crate::schema::{ParseResult, Schema, Settings};

pub struct StringTransformer;

impl Transformer for StringTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("typeError".into(), json!("Invalid string"));
        defaults.insert("enumError".into(), json!("Unknown enum option {value}"));
        defaults.insert("minlengthError".into(), json!("Invalid minlength"));
        defaults.insert("maxlengthError".into(), json!("Invalid maxlength"));
        defaults.insert("regexError".into(), json!("Invalid regex"));
        defaults
    }

    fn cast(&self, value: Value, _node: &Schema, _settings: &Settings) -> Value {
        match value {
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other,
        }
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        let text = match value.as_str() {
            Some(text) => text,
            None => {
                return Err(violation(node, settings, "typeError", "Invalid string", value, &[]))
            }
        };

        if let Some(allowed) = settings.array_option("enum") {
            if !allowed.iter().any(|option| option.as_str() == Some(text)) {
                return Err(violation(
                    node,
                    settings,
                    "enumError",
                    "Unknown enum option {value}",
                    value,
                    &[],
                ));
            }
        }

        if let Some(minlength) = settings.u64_option("minlength") {
            if (text.chars().count() as u64) < minlength {
                return Err(violation(
                    node,
                    settings,
                    "minlengthError",
                    "Invalid minlength",
                    value,
                    &[("minlength", minlength.to_string())],
                ));
            }
        }

        if let Some(maxlength) = settings.u64_option("maxlength") {
            if (text.chars().count() as u64) > maxlength {
                return Err(violation(
                    node,
                    settings,
                    "maxlengthError",
                    "Invalid maxlength",
                    value,
                    &[("maxlength", maxlength.to_string())],
                ));
            }
        }

        if let Some(pattern) = settings.str_option("regex") {
            // An uncompilable pattern reads as "nothing matches".
            let matched = Regex::new(pattern)
                .map(|re| re.is_match(text))
                .unwrap_or(false);
            if !matched {
                return Err(violation(
                    node,
                    settings,
                    "regexError",
                    "Invalid regex",
                    value,
                    &[("regex", pattern.to_string())],
                ));
            }
        }

        Ok(())
    }
}
