//! Registry of record-kind schemas.
//!
//! Built once at startup, frozen before the first line is decoded. The
//! frozen registry is a plain map — concurrent lookups need no locking
//! because mutation is impossible by construction.

use std::collections::HashMap;
use std::sync::Arc;

use zeekfeed_api::schema::RecordSchema;

use crate::error::EngineError;
use crate::kinds;

/// Startup-time registry assembly. Duplicate kinds are a programming error
/// and fail registration.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    schemas: HashMap<String, Arc<RecordSchema>>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: RecordSchema) -> Result<&mut Self, EngineError> {
        if self.schemas.contains_key(&schema.kind) {
            return Err(EngineError::DuplicateSchema(schema.kind));
        }
        tracing::debug!(kind = %schema.kind, fields = schema.fields.len(), "registered schema");
        self.schemas.insert(schema.kind.clone(), Arc::new(schema));
        Ok(self)
    }

    pub fn build(self) -> SchemaRegistry {
        SchemaRegistry { schemas: self.schemas }
    }
}

/// Immutable kind → schema map.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<RecordSchema>>,
}

impl SchemaRegistry {
    /// Registry preloaded with the shipped kinds.
    pub fn builtin() -> Self {
        let schemas = [kinds::dns::schema(), kinds::conn::schema(), kinds::http::schema()]
            .into_iter()
            .map(|schema| (schema.kind.clone(), Arc::new(schema)))
            .collect();
        Self { schemas }
    }

    pub fn lookup(&self, kind: &str) -> Result<Arc<RecordSchema>, EngineError> {
        self.schemas
            .get(kind)
            .cloned()
            .ok_or_else(|| EngineError::SchemaNotFound(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.schemas.contains_key(kind)
    }

    pub fn kind_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kinds_present() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.len(), 3);
        for kind in ["dns", "conn", "http"] {
            assert!(registry.contains(kind), "{kind}");
            assert_eq!(registry.lookup(kind).unwrap().kind, kind);
        }
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut builder = SchemaRegistryBuilder::new();
        builder.register(kinds::dns::schema()).unwrap();
        assert!(matches!(
            builder.register(kinds::dns::schema()),
            Err(EngineError::DuplicateSchema(kind)) if kind == "dns"
        ));
    }

    #[test]
    fn lookup_miss_is_an_error() {
        let registry = SchemaRegistryBuilder::new().build();
        assert!(matches!(
            registry.lookup("dhcp"),
            Err(EngineError::SchemaNotFound(kind)) if kind == "dhcp"
        ));
    }
}
