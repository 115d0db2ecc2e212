//! Transformer registry
//!
//! Maps type names to transformers. Lookup failure during resolution is a
//! schema authoring bug, not bad input data; construction checks names
//! eagerly and the engine guards again at parse time for loader-declared
//! types.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    ArrayTransformer, BigintTransformer, BooleanTransformer, DateTransformer, NumberTransformer,
    ObjectTransformer, SetTransformer, StringTransformer, Transformer,
};

/// Named transformer lookup.
pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<dyn Transformer>>,
}

impl TransformerRegistry {
    /// An empty registry. Most callers want [`TransformerRegistry::with_builtins`].
    pub fn new() -> Self {
        Self {
            transformers: HashMap::new(),
        }
    }

    /// A registry pre-loaded with the built-in types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("array", Arc::new(ArrayTransformer));
        registry.register("bigint", Arc::new(BigintTransformer));
        registry.register("boolean", Arc::new(BooleanTransformer));
        registry.register("date", Arc::new(DateTransformer));
        registry.register("number", Arc::new(NumberTransformer));
        registry.register("object", Arc::new(ObjectTransformer));
        registry.register("set", Arc::new(SetTransformer));
        registry.register("string", Arc::new(StringTransformer));
        registry
    }

    /// Registers a transformer under a name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, transformer: Arc<dyn Transformer>) {
        self.transformers.insert(name.into(), transformer);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Transformer>> {
        self.transformers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transformers.contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The process-wide registry used when construction receives no override.
pub fn default_registry() -> &'static Arc<TransformerRegistry> {
    static REGISTRY: Lazy<Arc<TransformerRegistry>> =
        Lazy::new(|| Arc::new(TransformerRegistry::with_builtins()));
    &REGISTRY
}
