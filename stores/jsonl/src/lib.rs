//! JSON-lines record store: one append-only `<collection>.jsonl` file per
//! collection, declared indices in a `<collection>.indices.json` sidecar.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;

use zeekfeed_api::error::StoreError;
use zeekfeed_api::record::Record;
use zeekfeed_api::schema::IndexSpec;
use zeekfeed_api::storage::RecordStore;

pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.jsonl"))
    }

    fn indices_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.indices.json"))
    }

    fn do_persist(&self, collection: &str, records: &[Record]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::io(format!("mkdir {}: {e}", self.data_dir.display())))?;

        let path = self.collection_path(collection);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(format!("open {}: {e}", path.display())))?;

        for record in records {
            let line = serde_json::to_string(&record.to_json())?;
            writeln!(file, "{line}")
                .map_err(|e| StoreError::io(format!("write {}: {e}", path.display())))?;
        }
        Ok(())
    }

    fn do_ensure_indices(&self, collection: &str, indices: &[IndexSpec]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::io(format!("mkdir {}: {e}", self.data_dir.display())))?;

        // The sidecar holds the full declared set; rewriting it with the
        // same set is the idempotent no-op the contract asks for.
        let path = self.indices_path(collection);
        let body = serde_json::to_string_pretty(indices)?;
        std::fs::write(&path, body)
            .map_err(|e| StoreError::io(format!("write {}: {e}", path.display())))
    }
}

impl RecordStore for JsonlStore {
    fn persist(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let collection = collection.to_string();
        Box::pin(async move { self.do_persist(&collection, &records) })
    }

    fn ensure_indices(
        &self,
        collection: &str,
        indices: &[IndexSpec],
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        let collection = collection.to_string();
        let indices = indices.to_vec();
        Box::pin(async move { self.do_ensure_indices(&collection, &indices) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use std::sync::Arc;

    use zeekfeed_api::config::CollectionsConfig;
    use zeekfeed_api::field::FieldKind;
    use zeekfeed_api::schema::RecordSchema;
    use zeekfeed_api::value::FieldValue;

    fn test_collection(config: &CollectionsConfig) -> String {
        config.dns_table.clone()
    }

    fn record(query: &str) -> Record {
        let schema = Arc::new(
            RecordSchema::new("dns", test_collection)
                .required_field("uid", "uid", FieldKind::Str)
                .field("query", "query", FieldKind::Str)
                .field("id.orig_p", "id_orig_p", FieldKind::Port),
        );
        Record::new(
            schema,
            vec![
                FieldValue::Str("Cxyz1".into()),
                FieldValue::Str(query.into()),
                FieldValue::Port(53),
            ],
        )
    }

    #[tokio::test]
    async fn persisted_lines_parse_back_with_target_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());

        store
            .persist("dns", vec![record("example.com"), record("example.org")])
            .await
            .unwrap();
        store.persist("dns", vec![record("example.net")]).await.unwrap();

        let file = std::fs::File::open(dir.path().join("dns.jsonl")).unwrap();
        let docs: Vec<serde_json::Value> = std::io::BufReader::new(file)
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0]["query"], serde_json::json!("example.com"));
        assert_eq!(docs[2]["query"], serde_json::json!("example.net"));
        assert_eq!(docs[0]["id_orig_p"], serde_json::json!(53));
        assert!(docs[0]["_id"].is_string());
    }

    #[tokio::test]
    async fn ensure_indices_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());
        let indices = vec![IndexSpec::hashed("id_orig_h"), IndexSpec::hashed("query")];

        store.ensure_indices("dns", &indices).await.unwrap();
        store.ensure_indices("dns", &indices).await.unwrap();

        let body = std::fs::read_to_string(dir.path().join("dns.indices.json")).unwrap();
        let parsed: Vec<IndexSpec> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, indices);
    }
}
