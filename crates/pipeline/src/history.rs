//! Usage and content history: records, statistics, and the store port.
//!
//! Records are append-only. Their identity is their position in the log; they
//! are never mutated or deleted once written.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BlogInputs, GenerationTime, Timestamp};

/// One completed generation, as tracked for usage statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// When the record was created.
    pub timestamp: Timestamp,
    /// Topic of the generated post.
    pub topic: String,
    /// Character count of the final (edited) text.
    pub content_length: usize,
    /// Wall-clock time of the run, in seconds.
    pub generation_time: GenerationTime,
}

impl UsageRecord {
    /// Creates a record stamped with the current time.
    pub fn new(topic: impl Into<String>, content_length: usize, generation_time: GenerationTime) -> Self {
        Self {
            timestamp: Timestamp::now(),
            topic: topic.into(),
            content_length,
            generation_time,
        }
    }
}

/// Inputs and timing stored alongside generated content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Normalised keywords.
    pub keywords: Vec<String>,
    /// Requested length in words.
    pub word_count: u32,
    /// Normalised key points.
    pub bullet_points: Vec<String>,
    /// Wall-clock time of the run, in seconds.
    pub generation_time: GenerationTime,
}

impl ContentMetadata {
    /// Builds the metadata for a run over `inputs`.
    pub fn from_inputs(inputs: &BlogInputs, generation_time: GenerationTime) -> Self {
        Self {
            keywords: inputs.keywords.clone(),
            word_count: inputs.length.as_u32(),
            bullet_points: inputs.bullet_points.clone(),
            generation_time,
        }
    }
}

/// A snapshot of one generated post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// When the record was created.
    pub timestamp: Timestamp,
    /// Topic of the generated post.
    pub topic: String,
    /// The final (edited) text.
    pub content: String,
    /// Inputs and timing.
    pub metadata: ContentMetadata,
}

impl ContentRecord {
    /// Creates a record stamped with the current time.
    pub fn new(topic: impl Into<String>, content: impl Into<String>, metadata: ContentMetadata) -> Self {
        Self {
            timestamp: Timestamp::now(),
            topic: topic.into(),
            content: content.into(),
            metadata,
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Aggregate view over the usage log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    /// Number of recorded runs.
    pub runs: usize,
    /// Sum of all generation times, in seconds.
    pub total_generation_secs: f64,
    /// Mean generation time, in seconds.
    pub average_generation_secs: f64,
    /// Mean content length, in characters.
    pub average_content_length: f64,
    /// Longest content, in characters.
    pub max_content_length: usize,
    /// Earliest record.
    pub first: Option<Timestamp>,
    /// Latest record.
    pub last: Option<Timestamp>,
}

impl UsageStats {
    /// Summarises `records`. An empty slice yields all-zero statistics.
    pub fn from_records(records: &[UsageRecord]) -> Self {
        let runs = records.len();
        let total_generation_secs: f64 = records
            .iter()
            .map(|r| r.generation_time.as_secs_f64())
            .sum();
        let total_length: usize = records.iter().map(|r| r.content_length).sum();
        let (average_generation_secs, average_content_length) = if runs == 0 {
            (0.0, 0.0)
        } else {
            (
                total_generation_secs / runs as f64,
                total_length as f64 / runs as f64,
            )
        };

        Self {
            runs,
            total_generation_secs,
            average_generation_secs,
            average_content_length,
            max_content_length: records.iter().map(|r| r.content_length).max().unwrap_or(0),
            first: records.iter().map(|r| r.timestamp).min(),
            last: records.iter().map(|r| r.timestamp).max(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store port
// ---------------------------------------------------------------------------

/// Errors reported by a [`HistoryStore`].
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The log file could not be read or written.
    #[error("history file '{}' could not be accessed: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The log file exists but does not hold a JSON array of records.
    ///
    /// The file is left untouched and the new record is dropped.
    #[error("history file '{}' is corrupt and was left unchanged: {source}", path.display())]
    Corrupt {
        /// The file involved.
        path: PathBuf,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialised.
    #[error("history record could not be serialised: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Port for the append-only usage and content logs.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends one usage record, preserving all prior records.
    async fn append_usage(&self, record: &UsageRecord) -> Result<(), HistoryError>;

    /// Appends one content record, preserving all prior records.
    async fn append_content(&self, record: &ContentRecord) -> Result<(), HistoryError>;

    /// Reads every usage record, oldest first. A missing log is empty.
    async fn load_usage(&self) -> Result<Vec<UsageRecord>, HistoryError>;

    /// Reads every content record, oldest first. A missing log is empty.
    async fn load_content(&self) -> Result<Vec<ContentRecord>, HistoryError>;
}
