//! In-memory record store. For tests and demos — nothing survives the
//! process.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::RwLock;

use zeekfeed_api::error::StoreError;
use zeekfeed_api::record::Record;
use zeekfeed_api::schema::IndexSpec;
use zeekfeed_api::storage::RecordStore;

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Record>>,
    indices: HashMap<String, Vec<IndexSpec>>,
    /// Collection name per `ensure_indices` call, in call order.
    ensure_calls: Vec<String>,
    /// Remaining persist calls to reject, for retry tests.
    fail_next_persists: u32,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::default()) }
    }

    pub async fn records(&self, collection: &str) -> Vec<Record> {
        self.inner
            .read()
            .await
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn indices(&self, collection: &str) -> Vec<IndexSpec> {
        self.inner
            .read()
            .await
            .indices
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn ensure_calls(&self) -> Vec<String> {
        self.inner.read().await.ensure_calls.clone()
    }

    /// Make the next `n` persist calls fail with a rejected-batch error.
    pub async fn fail_next_persists(&self, n: u32) {
        self.inner.write().await.fail_next_persists = n;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn persist(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let collection = collection.to_string();
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if inner.fail_next_persists > 0 {
                inner.fail_next_persists -= 1;
                return Err(StoreError::rejected(format!("injected failure for {collection:?}")));
            }
            inner.collections.entry(collection).or_default().extend(records);
            Ok(())
        })
    }

    fn ensure_indices(
        &self,
        collection: &str,
        indices: &[IndexSpec],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let collection = collection.to_string();
        let indices = indices.to_vec();
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            inner.ensure_calls.push(collection.clone());
            // Idempotent: the full declared set replaces whatever was there.
            inner.indices.insert(collection, indices);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use zeekfeed_api::config::CollectionsConfig;
    use zeekfeed_api::field::FieldKind;
    use zeekfeed_api::schema::RecordSchema;
    use zeekfeed_api::value::FieldValue;

    fn test_collection(config: &CollectionsConfig) -> String {
        config.dns_table.clone()
    }

    fn record(uid: &str) -> Record {
        let schema = Arc::new(
            RecordSchema::new("test", test_collection).required_field("uid", "uid", FieldKind::Str),
        );
        Record::new(schema, vec![FieldValue::Str(uid.into())])
    }

    #[tokio::test]
    async fn persist_appends_per_collection() {
        let store = MemoryStore::new();
        store.persist("dns", vec![record("C1"), record("C2")]).await.unwrap();
        store.persist("dns", vec![record("C3")]).await.unwrap();
        store.persist("conn", vec![record("C4")]).await.unwrap();

        assert_eq!(store.records("dns").await.len(), 3);
        assert_eq!(store.records("conn").await.len(), 1);
        assert!(store.records("http").await.is_empty());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let store = MemoryStore::new();
        store.fail_next_persists(1).await;
        assert!(store.persist("dns", vec![record("C1")]).await.is_err());
        assert!(store.persist("dns", vec![record("C1")]).await.is_ok());
        assert_eq!(store.records("dns").await.len(), 1);
    }

    #[tokio::test]
    async fn ensure_indices_replaces_the_set() {
        let store = MemoryStore::new();
        let indices = vec![IndexSpec::hashed("id_orig_h"), IndexSpec::plain("ts")];
        store.ensure_indices("dns", &indices).await.unwrap();
        store.ensure_indices("dns", &indices).await.unwrap();

        assert_eq!(store.indices("dns").await, indices);
        assert_eq!(store.ensure_calls().await.len(), 2);
    }
}
