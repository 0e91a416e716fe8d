pub mod config;
pub mod error;
pub mod field;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod storage;
pub mod value;

pub use config::CollectionsConfig;
pub use error::{DecodeError, SchemaError, StoreError, StoreErrorKind};
pub use field::{FieldKind, SourceFormat};
pub use normalize::{Identity, Normalizer};
pub use record::Record;
pub use schema::{FieldDescriptor, IndexSpec, RecordSchema};
pub use storage::RecordStore;
pub use value::FieldValue;
