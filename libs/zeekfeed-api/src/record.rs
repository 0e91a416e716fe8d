use std::sync::Arc;

use uuid::Uuid;

use crate::schema::RecordSchema;
use crate::value::FieldValue;

/// One decoded log entry.
///
/// Values are positional — index `i` holds the value of `schema.fields[i]`.
/// The record always carries exactly the declared field set; absent optional
/// fields hold their kind's unset value. Mutated once by the kind's
/// normalizer, immutable afterwards.
#[derive(Debug, Clone)]
pub struct Record {
    /// Engine-assigned identifier, unique per decode.
    pub id: Uuid,
    pub schema: Arc<RecordSchema>,
    pub values: Vec<FieldValue>,
}

impl Record {
    pub fn new(schema: Arc<RecordSchema>, values: Vec<FieldValue>) -> Self {
        Self {
            id: Uuid::new_v4(),
            schema,
            values,
        }
    }

    pub fn kind(&self) -> &str {
        &self.schema.kind
    }

    /// Value of a field by its stored name.
    pub fn get(&self, target_name: &str) -> Option<&FieldValue> {
        let idx = self.schema.field_index(target_name)?;
        self.values.get(idx)
    }

    pub fn get_mut(&mut self, target_name: &str) -> Option<&mut FieldValue> {
        let idx = self.schema.field_index(target_name)?;
        self.values.get_mut(idx)
    }

    /// Document form for stores that persist JSON: stored field names as
    /// keys, plus the record identifier under `_id`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut doc = serde_json::Map::with_capacity(self.values.len() + 1);
        doc.insert("_id".to_string(), serde_json::Value::String(self.id.to_string()));
        for (descriptor, value) in self.schema.fields.iter().zip(&self.values) {
            doc.insert(descriptor.target_name.clone(), value.to_json());
        }
        serde_json::Value::Object(doc)
    }
}
