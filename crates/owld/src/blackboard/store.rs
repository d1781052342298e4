//! [`JobStore`] implementations.

use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use owl_config::Config;

use super::errors::StoreError;
use super::record::JobRecord;
use super::{BLACKBOARD_TARGET, JobStore};

/// Store backed by a JSON file holding an array of records.
///
/// The file is re-read on every call.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Utf8PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl JobStore for JsonFileStore {
    fn records(&self) -> Result<Vec<JobRecord>, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<JobRecord> =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            target: BLACKBOARD_TARGET,
            path = %self.path,
            records = records.len(),
            "loaded blackboard snapshot"
        );
        Ok(records)
    }
}

/// Fixed set of records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Vec<JobRecord>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(records: Vec<JobRecord>) -> Self {
        Self { records }
    }
}

impl JobStore for InMemoryStore {
    fn records(&self) -> Result<Vec<JobRecord>, StoreError> {
        Ok(self.records.clone())
    }
}

/// Store used when no snapshot is configured; every query fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredStore;

impl JobStore for UnconfiguredStore {
    fn records(&self) -> Result<Vec<JobRecord>, StoreError> {
        Err(StoreError::NotConfigured)
    }
}

/// Picks the store described by the configuration.
#[must_use]
pub fn store_from_config(config: &Config) -> Arc<dyn JobStore> {
    match config.blackboard_path() {
        Some(path) => Arc::new(JsonFileStore::new(path)),
        None => Arc::new(UnconfiguredStore),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn snapshot(dir: &tempfile::TempDir, contents: &str) -> JsonFileStore {
        let path = dir.path().join("blackboard.json");
        fs::write(&path, contents).expect("write snapshot");
        JsonFileStore::new(Utf8PathBuf::from_path_buf(path).expect("utf8 path"))
    }

    #[test]
    fn reads_records_from_snapshot() {
        let dir = tempfile::tempdir().expect("temp dir");
        let contents = json!([
            {"GlobalJobId": "h#1.0#1", "Owner": "alice"},
            {"GlobalJobId": "h#2.0#2", "Owner": "bob"},
        ])
        .to_string();
        let store = snapshot(&dir, &contents);
        let records = store.records().expect("records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].owner.as_deref(), Some("bob"));
    }

    #[test]
    fn rereads_the_snapshot_on_every_call() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = snapshot(&dir, "[]");
        assert!(store.records().expect("records").is_empty());
        fs::write(store.path(), r#"[{"GlobalJobId": "h#1.0#1"}]"#).expect("rewrite");
        assert_eq!(store.records().expect("records").len(), 1);
    }

    #[rstest]
    #[case::not_json("not json")]
    #[case::not_an_array(r#"{"GlobalJobId": "h#1.0#1"}"#)]
    #[case::missing_id(r#"[{"Owner": "alice"}]"#)]
    fn rejects_invalid_snapshots(#[case] contents: &str) {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = snapshot(&dir, contents).records().expect_err("must fail");
        assert!(matches!(error, StoreError::Decode { .. }), "got {error:?}");
    }

    #[test]
    fn missing_snapshot_is_a_read_error() {
        let store = JsonFileStore::new("/nonexistent/owl/blackboard.json");
        assert!(matches!(store.records(), Err(StoreError::Read { .. })));
    }

    #[test]
    fn unconfigured_store_always_fails() {
        assert!(matches!(
            UnconfiguredStore.records(),
            Err(StoreError::NotConfigured)
        ));
    }
}
