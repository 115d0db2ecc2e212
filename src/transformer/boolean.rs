//! Boolean transformer

use serde_json::{json, Map, Value};

use super::{violation, Transformer};
use crate::schema::{ParseResult, Schema, Settings};

pub struct BooleanTransformer;

impl Transformer for BooleanTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("typeError".into(), json!("Invalid boolean"));
        defaults
    }

    fn cast(&self, value: Value, _node: &Schema, _settings: &Settings) -> Value {
        if let Value::String(text) = &value {
            if text == "true" {
                return json!(true);
            }
            if text == "false" {
                return json!(false);
            }
        }
        value
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        if value.is_boolean() {
            Ok(())
        } else {
            Err(violation(node, settings, "typeError", "Invalid boolean", value, &[]))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::{Schema, SchemaDef};
    use serde_json::json;

    #[test]
    fn test_accepts_booleans() {
        let schema = Schema::new(SchemaDef::of_type("boolean")).unwrap();
        assert_eq!(schema.parse(json!(true)).unwrap(), json!(true));
        assert_eq!(schema.parse(json!(false)).unwrap(), json!(false));
    }

    #[test]
    fn test_no_cast_unless_enabled() {
        let schema = Schema::new(SchemaDef::of_type("boolean")).unwrap();
        assert!(schema.parse(json!("true")).is_err());
    }

    #[test]
    fn test_auto_cast_from_strings() {
        let schema =
            Schema::new(SchemaDef::of_type("boolean").option("autoCast", true)).unwrap();
        assert_eq!(schema.parse(json!("true")).unwrap(), json!(true));
        assert_eq!(schema.parse(json!("false")).unwrap(), json!(false));
        assert!(schema.parse(json!("yes")).is_err());
    }
}
