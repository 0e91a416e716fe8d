//! Ingestion pipeline: raw lines in, routed batches out.
//!
//! Task topology per run:
//!
//! ```text
//! lines ─→ decode workers (N) ─→ batcher ─→ writer ─→ router ─→ store
//! ```
//!
//! Decode workers pull from the shared line channel, so any number of lines
//! decode concurrently; the writer is a single task, so writes to the run's
//! collection stay serialized. The batch channel is bounded by
//! `max_inflight_batches` — when the store is slow, the bound propagates
//! back through the record and line channels as backpressure.
//!
//! Cancellation stops line intake only: decodes already pulled finish, the
//! partial batch is flushed, and queued batches drain before the writer
//! exits. A partial record is never persisted because the decoder never
//! emits one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use zeekfeed_api::config::CollectionsConfig;
use zeekfeed_api::field::SourceFormat;
use zeekfeed_api::record::Record;
use zeekfeed_api::storage::RecordStore;

use crate::decoder::{RawLine, RecordDecoder};
use crate::error::EngineError;
use crate::registry::SchemaRegistry;
use crate::router::{DecodedBatch, IngestionRouter, RetryPolicy};

fn default_decode_workers() -> usize {
    4
}

fn default_batch_size() -> usize {
    500
}

fn default_max_inflight_batches() -> usize {
    4
}

fn default_retry_limit() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Concurrent decode tasks per run.
    #[serde(default = "default_decode_workers")]
    pub decode_workers: usize,

    /// Records per batch handed to the store.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batches allowed to queue ahead of the writer.
    #[serde(default = "default_max_inflight_batches")]
    pub max_inflight_batches: usize,

    /// Persist attempts before a batch is given up on.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Base backoff between persist attempts; doubles per attempt.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            decode_workers: default_decode_workers(),
            batch_size: default_batch_size(),
            max_inflight_batches: default_max_inflight_batches(),
            retry_limit: default_retry_limit(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl PipelineConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            limit: self.retry_limit.max(1),
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Aggregate counts for one run — the user-visible signal of how the stream
/// went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Lines decoded into records.
    pub decoded: u64,
    /// Lines skipped as malformed.
    pub rejected: u64,
    /// Batches handed to the router.
    pub batches: u64,
    /// Batches the store refused after all retries.
    pub failed_batches: u64,
    /// Records the store accepted.
    pub routed: u64,
}

/// One ingestion pipeline over a registry, store, and source dialect.
pub struct IngestPipeline {
    registry: Arc<SchemaRegistry>,
    router: Arc<IngestionRouter>,
    format: SourceFormat,
    config: PipelineConfig,
}

impl IngestPipeline {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn RecordStore>,
        collections: CollectionsConfig,
        format: SourceFormat,
        config: PipelineConfig,
    ) -> Self {
        let router = Arc::new(IngestionRouter::new(
            registry.clone(),
            store,
            collections,
            config.retry_policy(),
        ));
        Self::with_router(registry, router, format, config)
    }

    /// Build around an existing router, sharing its ensured-index state
    /// across runs.
    pub fn with_router(
        registry: Arc<SchemaRegistry>,
        router: Arc<IngestionRouter>,
        format: SourceFormat,
        config: PipelineConfig,
    ) -> Self {
        Self { registry, router, format, config }
    }

    /// Ingest one stream of lines of the given kind.
    ///
    /// Returns once the line channel closes (end of input) or the token is
    /// cancelled, after all decoded work has drained. An unknown kind is a
    /// configuration error and fails before any line is consumed; store
    /// failures after retry are counted per batch, never fatal for the run.
    pub async fn run(
        &self,
        kind: &str,
        lines: mpsc::Receiver<RawLine>,
        token: CancellationToken,
    ) -> Result<IngestReport, EngineError> {
        let schema = self.registry.lookup(kind)?;
        let decoder = Arc::new(RecordDecoder::new(schema, self.format.clone()));

        let workers = self.config.decode_workers.max(1);
        let batch_size = self.config.batch_size.max(1);
        let inflight = self.config.max_inflight_batches.max(1);

        let lines = Arc::new(tokio::sync::Mutex::new(lines));
        let decoded = Arc::new(AtomicU64::new(0));
        let rejected = Arc::new(AtomicU64::new(0));

        let (record_tx, mut record_rx) = mpsc::channel::<Record>(batch_size.max(64));
        let (batch_tx, mut batch_rx) = mpsc::channel::<DecodedBatch>(inflight);

        // ── Decode workers: shared line intake → records ──
        let mut handles = Vec::with_capacity(workers + 1);
        for _ in 0..workers {
            let task_lines = lines.clone();
            let task_decoder = decoder.clone();
            let task_tx = record_tx.clone();
            let task_decoded = decoded.clone();
            let task_rejected = rejected.clone();
            let task_token = token.clone();
            let task_kind = kind.to_string();

            handles.push(tokio::spawn(async move {
                loop {
                    let line = {
                        let mut rx = task_lines.lock().await;
                        tokio::select! {
                            line = rx.recv() => line,
                            _ = task_token.cancelled() => None,
                        }
                    };
                    let Some(line) = line else { break };

                    match task_decoder.decode(&line) {
                        Ok(mut record) => {
                            task_decoder.schema().normalizer.normalize(&mut record);
                            task_decoded.fetch_add(1, Ordering::Relaxed);
                            if task_tx.send(record).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            task_rejected.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(kind = %task_kind, error = %e, "skipping malformed line");
                        }
                    }
                }
            }));
        }
        drop(record_tx);

        // ── Batcher: records → bounded batch queue ──
        let batch_rejected = rejected.clone();
        handles.push(tokio::spawn(async move {
            let mut records = Vec::with_capacity(batch_size);
            while let Some(record) = record_rx.recv().await {
                records.push(record);
                if records.len() >= batch_size {
                    let batch = DecodedBatch {
                        records: std::mem::replace(&mut records, Vec::with_capacity(batch_size)),
                        rejected: batch_rejected.swap(0, Ordering::Relaxed),
                    };
                    if batch_tx.send(batch).await.is_err() {
                        return;
                    }
                }
            }
            if !records.is_empty() {
                let batch = DecodedBatch {
                    records,
                    rejected: batch_rejected.swap(0, Ordering::Relaxed),
                };
                let _ = batch_tx.send(batch).await;
            }
        }));

        // ── Writer: serialized hand-off to the store ──
        let mut report = IngestReport::default();
        while let Some(batch) = batch_rx.recv().await {
            report.batches += 1;
            let line_rejects = batch.rejected;
            match self.router.route(kind, batch).await {
                Ok(result) => {
                    report.routed += result.routed;
                    report.rejected += result.rejected;
                }
                Err(e) => {
                    report.failed_batches += 1;
                    report.rejected += line_rejects;
                    tracing::error!(kind, error = %e, "dropping batch");
                }
            }
        }

        for handle in handles {
            let _ = handle.await;
        }

        // Rejects after the last batch was cut (or on runs with no batch).
        report.rejected += rejected.swap(0, Ordering::Relaxed);
        report.decoded = decoded.load(Ordering::Relaxed);

        tracing::info!(
            kind,
            decoded = report.decoded,
            rejected = report.rejected,
            batches = report.batches,
            routed = report.routed,
            "ingest run finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_memory::MemoryStore;

    fn dns_pairs(uid: &str) -> Vec<(String, String)> {
        [
            ("ts", "1500000000.0"),
            ("uid", uid),
            ("id.orig_h", "10.0.0.1"),
            ("id.orig_p", "53"),
            ("id.resp_h", "8.8.8.8"),
            ("id.resp_p", "53"),
            ("query", "example.com"),
        ]
        .into_iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
    }

    fn pipeline(store: &Arc<MemoryStore>, batch_size: usize) -> IngestPipeline {
        IngestPipeline::new(
            Arc::new(SchemaRegistry::builtin()),
            store.clone(),
            CollectionsConfig::default(),
            SourceFormat::default(),
            PipelineConfig {
                decode_workers: 2,
                batch_size,
                max_inflight_batches: 2,
                retry_limit: 1,
                retry_backoff_ms: 1,
            },
        )
    }

    #[tokio::test]
    async fn mixed_stream_is_counted_and_flushed() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&store, 2);

        let (tx, rx) = mpsc::channel(16);
        for i in 0..5 {
            tx.send(RawLine::new(dns_pairs(&format!("C{i}")))).await.unwrap();
        }
        // Malformed: bad port.
        let mut bad = dns_pairs("Cbad");
        bad[3].1 = "not-a-port".to_string();
        tx.send(RawLine::new(bad)).await.unwrap();
        // Malformed: missing required uid.
        let mut missing = dns_pairs("Cmissing");
        missing.remove(1);
        tx.send(RawLine::new(missing)).await.unwrap();
        drop(tx);

        let report = pipeline
            .run("dns", rx, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.decoded, 5);
        assert_eq!(report.rejected, 2);
        assert_eq!(report.routed, 5);
        assert_eq!(report.failed_batches, 0);
        // 5 records at batch_size 2: two full batches plus the flushed tail.
        assert_eq!(report.batches, 3);
        assert_eq!(store.records("dns").await.len(), 5);
        assert_eq!(store.ensure_calls().await, vec!["dns".to_string()]);
    }

    #[tokio::test]
    async fn unknown_kind_fails_before_consuming_lines() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&store, 2);

        let (tx, rx) = mpsc::channel(4);
        tx.send(RawLine::new(dns_pairs("C0"))).await.unwrap();

        assert!(matches!(
            pipeline.run("dhcp", rx, CancellationToken::new()).await,
            Err(EngineError::SchemaNotFound(_))
        ));
        // Nothing reached the store.
        assert!(store.ensure_calls().await.is_empty());
        assert!(store.records("dns").await.is_empty());
    }

    #[tokio::test]
    async fn cancelled_run_stops_intake_and_reports() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&store, 2);

        let token = CancellationToken::new();
        token.cancel();
        let (tx, rx) = mpsc::channel(4);

        let report = pipeline.run("dns", rx, token).await.unwrap();
        assert_eq!(report, IngestReport::default());
        drop(tx);
    }

    #[tokio::test]
    async fn normalizer_runs_between_decode_and_routing() {
        use zeekfeed_api::normalize::Normalizer;
        use zeekfeed_api::schema::RecordSchema;
        use zeekfeed_api::value::FieldValue;

        use crate::registry::SchemaRegistryBuilder;

        /// Lower-cases one string field in place.
        struct Lowercase {
            field: &'static str,
        }

        impl Normalizer for Lowercase {
            fn normalize(&self, record: &mut Record) {
                if let Some(FieldValue::Str(s)) = record.get_mut(self.field) {
                    *s = s.to_lowercase();
                }
            }
        }

        fn collection(config: &CollectionsConfig) -> String {
            config.dns_table.clone()
        }

        let mut builder = SchemaRegistryBuilder::new();
        builder
            .register(
                RecordSchema::new("query_log", collection)
                    .required_field("uid", "uid", zeekfeed_api::field::FieldKind::Str)
                    .field("query", "query", zeekfeed_api::field::FieldKind::Str)
                    .with_normalizer(Arc::new(Lowercase { field: "query" })),
            )
            .unwrap();
        let registry = Arc::new(builder.build());

        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestPipeline::new(
            registry,
            store.clone(),
            CollectionsConfig::default(),
            SourceFormat::default(),
            PipelineConfig::default(),
        );

        let (tx, rx) = mpsc::channel(4);
        tx.send(RawLine::new(vec![
            ("uid".to_string(), "C1".to_string()),
            ("query".to_string(), "ExAmPlE.CoM".to_string()),
        ]))
        .await
        .unwrap();
        drop(tx);

        let report = pipeline
            .run("query_log", rx, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.decoded, 1);

        let records = store.records("dns").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("query"), Some(&FieldValue::Str("example.com".into())));
    }

    #[tokio::test]
    async fn failed_batches_do_not_end_the_run() {
        let store = Arc::new(MemoryStore::new());
        // First persist (first batch) fails, retry_limit is 1 → batch dropped.
        store.fail_next_persists(1).await;
        let pipeline = pipeline(&store, 2);

        let (tx, rx) = mpsc::channel(16);
        for i in 0..4 {
            tx.send(RawLine::new(dns_pairs(&format!("C{i}")))).await.unwrap();
        }
        drop(tx);

        let report = pipeline
            .run("dns", rx, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.decoded, 4);
        assert_eq!(report.batches, 2);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.routed, 2);
        assert_eq!(store.records("dns").await.len(), 2);
    }
}
