//! castform - a strict, schema-driven validation, casting and sanitization
//! engine
//!
//! Given a declarative schema describing the expected shape and type
//! constraints of a value, castform recursively inspects a
//! `serde_json::Value`, applies per-field coercion, runs validators, and
//! either returns a sanitized value or one `ValidationError` aggregating
//! every violation found in the pass.
//!
//! ```
//! use castform::{Schema, SchemaDef};
//! use serde_json::json;
//!
//! let schema = Schema::new(
//!     SchemaDef::from_value(&json!({
//!         "name": "string",
//!         "age": { "type": "number", "required": false }
//!     }))
//!     .unwrap(),
//! )
//! .unwrap();
//!
//! let clean = schema.parse(json!({ "name": "Ann" })).unwrap();
//! assert_eq!(clean, json!({ "name": "Ann" }));
//! ```

pub mod schema;
pub mod transformer;
pub mod utils;

pub use schema::{
    ParseCtx, ParseResult, Schema, SchemaDef, SchemaError, SchemaOptions, SchemaResult, Settings,
    TypeSpec, ValidationError,
};
pub use transformer::{default_registry, Transformer, TransformerRegistry};
