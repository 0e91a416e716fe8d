mod tsv;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use store_jsonl::JsonlStore;
use zeekfeed_engine::config::IngestConfig;
use zeekfeed_engine::error::EngineError;
use zeekfeed_engine::pipeline::{IngestPipeline, IngestReport};
use zeekfeed_engine::registry::SchemaRegistry;
use zeekfeed_engine::router::IngestionRouter;

#[derive(Parser)]
#[command(name = "zeekfeed-ingest", about = "Schema-driven Zeek log ingestion")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "zeekfeed.toml", env = "ZEEKFEED_CONFIG")]
    config: String,

    /// Directory the JSONL store writes into.
    #[arg(long, default_value = "data")]
    data_dir: String,

    /// Record kind to decode as, overriding each log's `#path` header.
    #[arg(long)]
    kind: Option<String>,

    /// Zeek TSV log files to ingest.
    #[arg(required = true)]
    logs: Vec<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = if std::path::Path::new(&cli.config).exists() {
        tracing::info!(config = %cli.config, "loading configuration");
        match IngestConfig::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "failed to load config");
                std::process::exit(1);
            }
        }
    } else {
        tracing::info!("no configuration file, using defaults");
        IngestConfig::default()
    };

    let registry = Arc::new(SchemaRegistry::builtin());
    let store = Arc::new(JsonlStore::new(&cli.data_dir));
    // One router for the whole invocation, so each collection's indices are
    // ensured once even when several files feed it.
    let router = Arc::new(IngestionRouter::new(
        registry.clone(),
        store,
        config.collections.clone(),
        config.pipeline.retry_policy(),
    ));

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down...");
            signal_token.cancel();
        }
    });

    let mut failed = false;
    for path in &cli.logs {
        if token.is_cancelled() {
            break;
        }
        match ingest_file(path, cli.kind.as_deref(), &registry, &router, &config, &token).await {
            Ok(report) => tracing::info!(
                file = %path,
                decoded = report.decoded,
                rejected = report.rejected,
                batches = report.batches,
                failed_batches = report.failed_batches,
                routed = report.routed,
                "ingested"
            ),
            Err(e) => {
                failed = true;
                tracing::error!(file = %path, error = %e, "ingest failed");
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}

async fn ingest_file(
    path: &str,
    kind_override: Option<&str>,
    registry: &Arc<SchemaRegistry>,
    router: &Arc<IngestionRouter>,
    config: &IngestConfig,
    token: &CancellationToken,
) -> Result<IngestReport, EngineError> {
    let file = std::fs::File::open(path)?;
    let mut reader = tsv::ZeekTsvReader::new(std::io::BufReader::new(file))?;

    let kind = match kind_override.or(reader.header().path.as_deref()) {
        Some(kind) => kind.to_string(),
        None => {
            return Err(EngineError::Config(format!(
                "{path}: no #path header and no --kind override"
            )));
        }
    };

    // Each file declares its own dialect; the pipeline shares the router.
    let format = reader.header().source_format(&config.format);
    let pipeline = IngestPipeline::with_router(
        registry.clone(),
        router.clone(),
        format,
        config.pipeline.clone(),
    );

    let (tx, rx) = mpsc::channel(1024);
    let reader_token = token.clone();
    let producer = tokio::task::spawn_blocking(move || {
        loop {
            if reader_token.is_cancelled() {
                break;
            }
            match reader.next_line() {
                Ok(Some(line)) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "read error");
                    break;
                }
            }
        }
    });

    let report = pipeline.run(&kind, rx, token.clone()).await;
    let _ = producer.await;
    report
}
