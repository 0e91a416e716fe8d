use std::fmt;
use std::sync::Arc;

use crate::config::CollectionsConfig;
use crate::field::FieldKind;
use crate::normalize::{Identity, Normalizer};

/// Mapping of one source field to its stored form.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Name in the source log (e.g. `id.orig_h`).
    pub source_name: String,
    /// Name in the stored record (e.g. `id_orig_h`).
    pub target_name: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Secondary-index declaration for a target collection.
///
/// A set: order between specs is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IndexSpec {
    pub field_name: String,
    pub hashed: bool,
}

impl IndexSpec {
    pub fn plain(field_name: impl Into<String>) -> Self {
        Self { field_name: field_name.into(), hashed: false }
    }

    pub fn hashed(field_name: impl Into<String>) -> Self {
        Self { field_name: field_name.into(), hashed: true }
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hashed {
            write!(f, "$hashed:{}", self.field_name)
        } else {
            write!(f, "{}", self.field_name)
        }
    }
}

/// Everything the engine needs to know about one record kind: the ordered
/// field mapping, where its records go, which indices the collection needs,
/// and the post-decode cleanup strategy.
///
/// Schemas are plain constructed data — adding a record kind means building
/// one of these and registering it, never touching the decoder.
#[derive(Clone)]
pub struct RecordSchema {
    pub kind: String,
    pub fields: Vec<FieldDescriptor>,
    /// Resolves the destination collection name from configuration.
    pub collection: fn(&CollectionsConfig) -> String,
    pub indices: Vec<IndexSpec>,
    pub normalizer: Arc<dyn Normalizer>,
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("kind", &self.kind)
            .field("fields", &self.fields.len())
            .field("indices", &self.indices)
            .finish()
    }
}

impl RecordSchema {
    pub fn new(kind: impl Into<String>, collection: fn(&CollectionsConfig) -> String) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
            collection,
            indices: Vec::new(),
            normalizer: Arc::new(Identity),
        }
    }

    /// Declare an optional field.
    pub fn field(mut self, source: &str, target: &str, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor {
            source_name: source.to_string(),
            target_name: target.to_string(),
            kind,
            required: false,
        });
        self
    }

    /// Declare a field that must be present on every line.
    pub fn required_field(mut self, source: &str, target: &str, kind: FieldKind) -> Self {
        self.fields.push(FieldDescriptor {
            source_name: source.to_string(),
            target_name: target.to_string(),
            kind,
            required: true,
        });
        self
    }

    pub fn index(mut self, field_name: &str) -> Self {
        self.indices.push(IndexSpec::plain(field_name));
        self
    }

    pub fn hashed_index(mut self, field_name: &str) -> Self {
        self.indices.push(IndexSpec::hashed(field_name));
        self
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Position of a field by its stored name.
    pub fn field_index(&self, target_name: &str) -> Option<usize> {
        self.fields.iter().position(|d| d.target_name == target_name)
    }
}
