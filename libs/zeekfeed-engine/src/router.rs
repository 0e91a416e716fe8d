//! Ingestion router: decoded batches → the record store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use zeekfeed_api::config::CollectionsConfig;
use zeekfeed_api::record::Record;
use zeekfeed_api::schema::IndexSpec;
use zeekfeed_api::storage::RecordStore;

use crate::error::EngineError;
use crate::registry::SchemaRegistry;

/// Bounded retry for persist calls that the store rejects transiently.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub limit: u32,
    /// Delay before the second attempt; doubles per attempt after that.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { limit: 3, backoff: Duration::from_millis(100) }
    }
}

/// A batch leaving the decode stage: the surviving records plus the number
/// of lines the decoders rejected while producing them.
#[derive(Debug, Default)]
pub struct DecodedBatch {
    pub records: Vec<Record>,
    pub rejected: u64,
}

/// Counts for one routed batch: records handed to the store vs. lines
/// rejected at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteResult {
    pub routed: u64,
    pub rejected: u64,
}

/// Resolves where a kind's records go and hands batches to the store.
///
/// Index creation happens once per collection — the first batch routed to a
/// collection ensures its indices, later batches skip the call. The store's
/// `ensure_indices` is idempotent anyway; the once-guard just avoids the
/// round trip.
pub struct IngestionRouter {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn RecordStore>,
    collections: CollectionsConfig,
    retry: RetryPolicy,
    ensured: tokio::sync::Mutex<HashSet<String>>,
}

impl IngestionRouter {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn RecordStore>,
        collections: CollectionsConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            store,
            collections,
            retry,
            ensured: tokio::sync::Mutex::new(HashSet::new()),
        }
    }

    pub async fn route(&self, kind: &str, batch: DecodedBatch) -> Result<RouteResult, EngineError> {
        let schema = self.registry.lookup(kind)?;
        let collection = (schema.collection)(&self.collections);

        self.ensure_indices_once(&collection, &schema.indices).await?;

        let routed = batch.records.len() as u64;
        if !batch.records.is_empty() {
            self.persist_with_retry(&collection, batch.records).await?;
        }

        Ok(RouteResult { routed, rejected: batch.rejected })
    }

    async fn ensure_indices_once(
        &self,
        collection: &str,
        indices: &[IndexSpec],
    ) -> Result<(), EngineError> {
        let mut ensured = self.ensured.lock().await;
        if ensured.contains(collection) {
            return Ok(());
        }
        self.store
            .ensure_indices(collection, indices)
            .await
            .map_err(|e| EngineError::Store(e.with_context(format!("collection {collection:?}"))))?;
        ensured.insert(collection.to_string());
        tracing::debug!(collection, indices = indices.len(), "ensured indices");
        Ok(())
    }

    async fn persist_with_retry(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Result<(), EngineError> {
        let mut backoff = self.retry.backoff;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.store.persist(collection, records.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retry.limit => {
                    tracing::warn!(collection, attempt, error = %e, "persist failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    return Err(EngineError::Store(e.with_context(format!(
                        "collection {collection:?} after {attempt} attempts"
                    ))));
                }
            }
        }
    }
}
