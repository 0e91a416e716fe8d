use std::future::Future;
use std::pin::Pin;

use crate::error::StoreError;
use crate::record::Record;
use crate::schema::IndexSpec;

/// Record store trait.
///
/// The engine doesn't enumerate or know concrete implementations. For the
/// engine, persistence is just this trait: hand off a batch, declare the
/// indices the collection needs.
pub trait RecordStore: Send + Sync {
    /// Persist a batch of records into the named collection.
    fn persist(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;

    /// Create the declared secondary indices on the collection.
    ///
    /// Idempotent — ensuring an index that already exists is a no-op, not an
    /// error.
    fn ensure_indices(
        &self,
        collection: &str,
        indices: &[IndexSpec],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}
