//! Number transformer
//!
//! Integers and floats both pass; numeric strings convert under the
//! default `autoCast`.

use serde_json::{json, Map, Number, Value};

use super::{violation, Transformer};
use crate::schema::{ParseResult, Schema, Settings};

pub struct NumberTransformer;

impl Transformer for NumberTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("autoCast".into(), json!(true));
        defaults.insert("typeError".into(), json!("Invalid number"));
        defaults.insert("minError".into(), json!("minimum accepted value is {min}"));
        defaults.insert("maxError".into(), json!("maximum accepted value is {max}"));
        defaults
    }

    fn cast(&self, value: Value, _node: &Schema, _settings: &Settings) -> Value {
        if let Value::String(text) = &value {
            let text = text.trim();
            if let Ok(int) = text.parse::<i64>() {
                return json!(int);
            }
            if let Ok(float) = text.parse::<f64>() {
                if let Some(number) = Number::from_f64(float) {
                    return Value::Number(number);
                }
            }
        }
        value
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        let number = match value.as_f64() {
            Some(number) => number,
            None => {
                return Err(violation(node, settings, "typeError", "Invalid number", value, &[]))
            }
        };

        if let Some(min) = settings.f64_option("min") {
            if number < min {
                return Err(violation(
                    node,
                    settings,
                    "minError",
                    "minimum accepted value is {min}",
                    value,
                    &[("min", min.to_string())],
                ));
            }
        }
        if let Some(max) = settings.f64_option("max") {
            if number > max {
                return Err(violation(
                    node,
                    settings,
                    "maxError",
                    "maximum accepted value is {max}",
                    value,
                    &[("max", max.to_string())],
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::{Schema, SchemaDef};
    use serde_json::json;

    #[test]
    fn test_accepts_integers_and_floats() {
        let schema = Schema::new(SchemaDef::of_type("number")).unwrap();
        assert_eq!(schema.parse(json!(42)).unwrap(), json!(42));
        assert_eq!(schema.parse(json!(99.5)).unwrap(), json!(99.5));
    }

    #[test]
    fn test_auto_cast_numeric_strings_by_default() {
        let schema = Schema::new(SchemaDef::of_type("number")).unwrap();
        assert_eq!(schema.parse(json!("42")).unwrap(), json!(42));
        assert_eq!(schema.parse(json!(" 3.5 ")).unwrap(), json!(3.5));
    }

    #[test]
    fn test_auto_cast_can_be_disabled_per_node() {
        let schema =
            Schema::new(SchemaDef::of_type("number").option("autoCast", false)).unwrap();
        let err = schema.parse(json!("42")).unwrap_err();
        assert_eq!(err.message, "Invalid number");
    }

    #[test]
    fn test_non_numeric_string_fails_validation() {
        let schema = Schema::new(SchemaDef::of_type("number")).unwrap();
        let err = schema.parse(json!("abc")).unwrap_err();
        assert_eq!(err.message, "Invalid number");
        assert_eq!(err.value, json!("abc"));
    }

    #[test]
    fn test_min_max_constraints() {
        let schema = Schema::new(
            SchemaDef::of_type("number").option("min", 0).option("max", 10),
        )
        .unwrap();
        assert!(schema.parse(json!(5)).is_ok());

        let err = schema.parse(json!(-1)).unwrap_err();
        assert_eq!(err.message, "minimum accepted value is 0");
        let err = schema.parse(json!(11)).unwrap_err();
        assert_eq!(err.message, "maximum accepted value is 10");
    }
}
