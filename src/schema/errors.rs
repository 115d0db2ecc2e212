//! Schema error types
//!
//! Two disjoint error kinds:
//! - `SchemaError`: authoring mistakes caught while constructing a schema
//!   tree. These abort construction immediately; they indicate a schema
//!   bug, not bad input data.
//! - `ValidationError`: data violations found while parsing a value. A
//!   nested parse aggregates every child failure into one error whose
//!   `errors` list enumerates all of them.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use thiserror::Error;

/// Result type for schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for parsing values against a schema.
pub type ParseResult<T> = Result<T, ValidationError>;

/// Authoring-time schema errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A type name does not resolve to a registered transformer.
    #[error("Don't know how to resolve {name} in property {path}")]
    UnknownType { name: String, path: String },

    /// `required: true` and a default value are mutually exclusive.
    #[error("Remove either the 'required' or the 'default' option for property {path}")]
    RequiredAndDefault { path: String },

    /// A declarative description could not be classified.
    #[error("Invalid schema description in property {path}: {reason}")]
    InvalidDescription { path: String, reason: String },
}

impl SchemaError {
    pub fn unknown_type(name: impl Into<String>, path: impl Into<String>) -> Self {
        SchemaError::UnknownType {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn required_and_default(path: impl Into<String>) -> Self {
        SchemaError::RequiredAndDefault { path: path.into() }
    }

    pub fn invalid_description(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidDescription {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A data validation failure.
///
/// Leaf failures carry an empty `errors` list; a nested failure aggregates
/// every independent child failure found in one pass, so a single parse
/// call reports all problems with an input at once.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Human-readable message, already rendered from its template.
    pub message: String,
    /// The offending input value; `null` when the value was absent.
    pub value: Value,
    /// Full dotted path of the originating schema node, when known.
    pub field: Option<String>,
    /// Ordered sub-errors; empty for a leaf failure.
    pub errors: Vec<ValidationError>,
}

impl ValidationError {
    /// Creates a leaf error with no value or field attached yet.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            value: Value::Null,
            field: None,
            errors: Vec::new(),
        }
    }

    /// Attaches the offending value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Attaches the originating node's full dotted path. An empty path
    /// (the anonymous root) leaves the field unset.
    pub fn with_field(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.field = if path.is_empty() { None } else { Some(path) };
        self
    }

    /// Creates the aggregate thrown by a nested node. The message stays
    /// generic; the sub-error list carries the specifics.
    pub fn aggregate(path: &str, value: Value, errors: Vec<ValidationError>) -> Self {
        Self {
            message: "Data is not valid".to_string(),
            value,
            field: if path.is_empty() { None } else { Some(path.to_string()) },
            errors,
        }
    }

    /// Structural validation failure for one unknown property.
    pub fn unknown_property(path: impl Into<String>, value: Value) -> Self {
        let path = path.into();
        Self::new(format!("Unknown property {}", path))
            .with_value(value)
            .with_field(path)
    }

    /// Summary failure after every union candidate was tried and rejected.
    pub fn unresolved_union(path: impl Into<String>, value: Value) -> Self {
        Self::new("Could not resolve given value type")
            .with_value(value)
            .with_field(path)
    }

    /// Parse-time guard for a type name missing from the registry.
    pub fn unknown_type(name: &str, path: impl Into<String>) -> Self {
        Self::new(format!("Don't know how to resolve {}", name)).with_field(path)
    }

    /// True when this error aggregates sub-errors.
    pub fn is_aggregate(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}
