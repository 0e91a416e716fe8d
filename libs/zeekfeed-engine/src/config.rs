use serde::Deserialize;

use zeekfeed_api::config::CollectionsConfig;
use zeekfeed_api::field::SourceFormat;

use crate::error::EngineError;
use crate::pipeline::PipelineConfig;

/// Root configuration — parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestConfig {
    /// Destination collection names per record kind.
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Pipeline sizing and retry behavior.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Source dialect (sentinels, separators, bool tokens).
    #[serde(default)]
    pub format: SourceFormat,
}

impl IngestConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}
