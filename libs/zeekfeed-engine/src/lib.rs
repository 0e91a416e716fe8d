pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod kinds;
pub mod pipeline;
pub mod registry;
pub mod router;

pub use config::IngestConfig;
pub use decoder::{RawLine, RecordDecoder};
pub use error::EngineError;
pub use pipeline::{IngestPipeline, IngestReport, PipelineConfig};
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use router::{DecodedBatch, IngestionRouter, RetryPolicy, RouteResult};
