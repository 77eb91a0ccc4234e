//! Blogsmith history infrastructure adapter.
//!
//! Implements the [`pipeline::HistoryStore`] trait over two JSON files, each
//! holding a single array of records:
//!
//! - `usage_stats.json`: one [`UsageRecord`] per successful run
//! - `generated_content.json`: one [`ContentRecord`] per successful run
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File I/O and serialisation live here. The
//! [`pipeline`] crate sees only [`pipeline::HistoryStore`].
//!
//! ## Write protocol
//!
//! An append loads the array with its elements kept as raw JSON, pushes the
//! new record, writes the array to a sibling `.tmp` file, syncs it and renames
//! it over the original. Earlier records are reproduced byte for byte. A file
//! that exists but is not a JSON array is reported as
//! [`HistoryError::Corrupt`] and is never rewritten. Appends from one store
//! are serialised.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{ContentRecord, HistoryError, HistoryStore, UsageRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// File name of the usage log.
pub const USAGE_FILE: &str = "usage_stats.json";

/// File name of the content log.
pub const CONTENT_FILE: &str = "generated_content.json";

/// [`HistoryStore`] backed by two JSON array files.
#[derive(Debug)]
pub struct JsonFileHistory {
    usage_path: PathBuf,
    content_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileHistory {
    /// Uses the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(USAGE_FILE), dir.join(CONTENT_FILE))
    }

    /// Uses explicit file paths.
    pub fn new(usage_path: impl Into<PathBuf>, content_path: impl Into<PathBuf>) -> Self {
        Self {
            usage_path: usage_path.into(),
            content_path: content_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the usage log.
    pub fn usage_path(&self) -> &Path {
        &self.usage_path
    }

    /// Location of the content log.
    pub fn content_path(&self) -> &Path {
        &self.content_path
    }

    async fn append<T: Serialize>(&self, path: &Path, record: &T) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;
        // Earlier elements stay raw so they are written back byte for byte.
        let mut records: Vec<Box<RawValue>> = load(path).await?;
        records.push(pretty_element(record)?);
        write_atomically(path, &records).await?;
        debug!(path = %path.display(), records = records.len(), "history appended");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistory {
    #[instrument(skip_all, fields(path = %self.usage_path.display()))]
    async fn append_usage(&self, record: &UsageRecord) -> Result<(), HistoryError> {
        self.append(&self.usage_path, record).await
    }

    #[instrument(skip_all, fields(path = %self.content_path.display()))]
    async fn append_content(&self, record: &ContentRecord) -> Result<(), HistoryError> {
        self.append(&self.content_path, record).await
    }

    async fn load_usage(&self) -> Result<Vec<UsageRecord>, HistoryError> {
        load(&self.usage_path).await
    }

    async fn load_content(&self) -> Result<Vec<ContentRecord>, HistoryError> {
        load(&self.content_path).await
    }
}

/// Reads a JSON array from `path`; a missing file is an empty array.
async fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, HistoryError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(HistoryError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| HistoryError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_atomically<T: Serialize>(path: &Path, records: &[T]) -> Result<(), HistoryError> {
    let body = serde_json::to_vec_pretty(records).map_err(HistoryError::Serialize)?;
    let tmp = temp_path(path);
    let io_err = |source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }
    Ok(())
}

/// Serialises `record` as it will appear inside the pretty-printed array.
fn pretty_element<T: Serialize>(record: &T) -> Result<Box<RawValue>, HistoryError> {
    let text = serde_json::to_string_pretty(record).map_err(HistoryError::Serialize)?;
    // JSON strings escape newlines, so every '\n' here is layout.
    RawValue::from_string(text.replace('\n', "\n  ")).map_err(HistoryError::Serialize)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pipeline::{ContentMetadata, GenerationTime};

    use super::*;

    fn usage(topic: &str, length: usize) -> UsageRecord {
        UsageRecord::new(topic, length, GenerationTime::from_secs(1.5).unwrap())
    }

    #[tokio::test]
    async fn first_append_creates_a_one_record_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistory::in_dir(dir.path());

        store.append_usage(&usage("Solar Power", 42)).await.unwrap();

        let records = store.load_usage().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].topic, "Solar Power");
        assert!(dir.path().join(USAGE_FILE).exists());
        assert!(!dir.path().join("usage_stats.json.tmp").exists());
    }

    #[tokio::test]
    async fn appends_preserve_earlier_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistory::in_dir(dir.path());

        for i in 0..4 {
            store.append_usage(&usage("t", i)).await.unwrap();
            let lengths: Vec<usize> = store
                .load_usage()
                .await
                .unwrap()
                .iter()
                .map(|r| r.content_length)
                .collect();
            assert_eq!(lengths, (0..=i).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn missing_logs_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistory::in_dir(dir.path());

        assert!(store.load_usage().await.unwrap().is_empty());
        assert!(store.load_content().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_log_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(USAGE_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileHistory::in_dir(dir.path());

        let err = store.append_usage(&usage("t", 1)).await.unwrap_err();

        assert!(matches!(err, HistoryError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    /// Everything before the closing bracket of a pretty-printed array.
    fn body_without_close(text: &str) -> &str {
        text.strip_suffix("\n]").unwrap_or(text)
    }

    #[tokio::test]
    async fn earlier_records_are_rewritten_byte_for_byte() {
        for n in 0..50u64 {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileHistory::in_dir(dir.path());
            let elapsed = Duration::from_nanos(12_345_678_901 + n * 7_919_113);
            store
                .append_usage(&UsageRecord::new("first", 1, GenerationTime::from_duration(elapsed)))
                .await
                .unwrap();
            let before = std::fs::read_to_string(store.usage_path()).unwrap();

            store.append_usage(&usage("second", 2)).await.unwrap();

            let after = std::fs::read_to_string(store.usage_path()).unwrap();
            assert!(
                after.starts_with(body_without_close(&before)),
                "prior record changed:\n{before}\n---\n{after}"
            );
            let records = store.load_usage().await.unwrap();
            assert_eq!(records[0].generation_time, GenerationTime::from_duration(elapsed));
        }
    }

    #[tokio::test]
    async fn logs_with_offset_free_timestamps_accept_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(USAGE_FILE);
        let existing = r#"[
  {
    "timestamp": "2024-05-01T12:00:00.123456",
    "topic": "Solar Power",
    "content_length": 1200,
    "generation_time": 12.432789144000001
  }
]"#;
        std::fs::write(&path, existing).unwrap();
        let store = JsonFileHistory::in_dir(dir.path());

        store.append_usage(&usage("Wind Power", 900)).await.unwrap();

        let after = std::fs::read_to_string(&path).unwrap();
        assert!(after.starts_with(body_without_close(existing)));
        let records = store.load_usage().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].topic, "Solar Power");
        assert_eq!(records[1].topic, "Wind Power");
    }

    #[tokio::test]
    async fn non_array_log_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONTENT_FILE);
        std::fs::write(&path, r#"{"topic": "x"}"#).unwrap();
        let store = JsonFileHistory::in_dir(dir.path());
        let metadata = ContentMetadata {
            keywords: vec![],
            word_count: 800,
            bullet_points: vec![],
            generation_time: GenerationTime::from_secs(1.0).unwrap(),
        };

        let err = store
            .append_content(&ContentRecord::new("t", "c", metadata))
            .await
            .unwrap_err();

        assert!(matches!(err, HistoryError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"topic": "x"}"#);
    }

    #[tokio::test]
    async fn content_records_round_trip_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistory::in_dir(dir.path());
        let metadata = ContentMetadata {
            keywords: vec!["solar".into(), "renewable".into()],
            word_count: 800,
            bullet_points: vec!["Cost".into()],
            generation_time: GenerationTime::from_secs(12.0).unwrap(),
        };

        store
            .append_content(&ContentRecord::new("Solar Power", "# Solar", metadata.clone()))
            .await
            .unwrap();

        let records = store.load_content().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "# Solar");
        assert_eq!(records[0].metadata, metadata);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.content_path()).unwrap()).unwrap();
        assert!(raw.is_array());
    }

    #[tokio::test]
    async fn missing_parent_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistory::in_dir(dir.path().join("nested/history"));

        store.append_usage(&usage("t", 1)).await.unwrap();

        assert_eq!(store.load_usage().await.unwrap().len(), 1);
    }
}
