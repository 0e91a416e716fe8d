use zeekfeed_api::error::{DecodeError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("duplicate schema for kind {0:?}")]
    DuplicateSchema(String),

    #[error("no schema registered for kind {0:?}")]
    SchemaNotFound(String),

    #[error("decode failed for kind {kind:?} field {field:?}: {cause}")]
    RecordDecode {
        kind: String,
        field: String,
        #[source]
        cause: DecodeError,
    },

    #[error("missing required field {field:?} for kind {kind:?}")]
    MissingRequiredField { kind: String, field: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// For `Store`, context is added to the inner `StoreError`. For `Config`,
    /// it is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Store(e) => EngineError::Store(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
