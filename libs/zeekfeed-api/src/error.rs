use std::fmt;

/// Schema construction errors. These indicate a programming error and are
/// fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown field kind {0:?}")]
    UnknownFieldKind(String),

    #[error("vector elements must be scalar kinds")]
    NestedVector,
}

/// Per-field coercion failure. Always a value result — a bad field never
/// aborts anything beyond its own line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid count {0:?}")]
    InvalidCount(String),

    #[error("invalid interval {0:?}")]
    InvalidInterval(String),

    #[error("invalid bool {0:?}")]
    InvalidBool(String),

    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("invalid time {0:?}")]
    InvalidTime(String),

    #[error("invalid vector element {index}: {inner}")]
    InvalidVectorElement { index: usize, inner: Box<DecodeError> },
}

/// Error kind for store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Serialize,
    /// The store refused the batch (full, unavailable, constraint hit).
    Rejected,
}

/// Error returned by `RecordStore` implementations.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: StoreErrorKind::Io, message: msg.into() }
    }

    pub fn serialize(msg: impl Into<String>) -> Self {
        Self { kind: StoreErrorKind::Serialize, message: msg.into() }
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self { kind: StoreErrorKind::Rejected, message: msg.into() }
    }

    /// Add context to the error, preserving the original kind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialize(e.to_string())
    }
}
