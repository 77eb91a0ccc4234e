//! Best-effort usage and content recording.
//!
//! Wraps a [`HistoryStore`] so that a failed append becomes a warning on the
//! run's progress surface and in the logs, and never an error for the caller.

use std::sync::Arc;

use pipeline::{
    ContentMetadata, ContentRecord, GenerationTime, HistoryStore, RunContext, UsageRecord,
};
use tracing::{debug, warn};

/// Records usage and content without ever failing the caller.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl HistoryRecorder {
    /// Creates a recorder over `store`.
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Appends a usage record; failures are reported as warnings.
    pub async fn record_usage(
        &self,
        topic: &str,
        content_length: usize,
        generation_time: GenerationTime,
        ctx: &RunContext,
    ) {
        let record = UsageRecord::new(topic, content_length, generation_time);
        match self.store.append_usage(&record).await {
            Ok(()) => debug!(run_id = %ctx.run_id(), "usage recorded"),
            Err(e) => {
                warn!(run_id = %ctx.run_id(), error = %e, "failed to track usage");
                ctx.warn(format!("Failed to track usage: {e}"));
            }
        }
    }

    /// Appends a content record; failures are reported as warnings.
    pub async fn record_content(
        &self,
        topic: &str,
        content: &str,
        metadata: ContentMetadata,
        ctx: &RunContext,
    ) {
        let record = ContentRecord::new(topic, content, metadata);
        match self.store.append_content(&record).await {
            Ok(()) => debug!(run_id = %ctx.run_id(), "content stored"),
            Err(e) => {
                warn!(run_id = %ctx.run_id(), error = %e, "failed to store content");
                ctx.warn(format!("Failed to store content: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pipeline::{CollectingReporter, ProgressEvent};

    use super::*;
    use crate::testing::MemoryHistory;

    fn secs(s: f64) -> GenerationTime {
        GenerationTime::from_secs(s).unwrap()
    }

    #[tokio::test]
    async fn each_call_appends_exactly_one_record() {
        let store = Arc::new(MemoryHistory::default());
        let recorder = HistoryRecorder::new(store.clone());
        let ctx = RunContext::detached();

        for i in 0..3 {
            recorder.record_usage("topic", i, secs(1.0), &ctx).await;
        }

        let lengths: Vec<usize> = store.usage.lock().unwrap().iter().map(|r| r.content_length).collect();
        assert_eq!(lengths, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn failures_become_warnings() {
        let store = Arc::new(MemoryHistory {
            fail_usage: true,
            fail_content: true,
            ..MemoryHistory::default()
        });
        let recorder = HistoryRecorder::new(store);
        let collector = Arc::new(CollectingReporter::new());
        let ctx = RunContext::new(collector.clone());
        let metadata = ContentMetadata {
            keywords: vec![],
            word_count: 800,
            bullet_points: vec![],
            generation_time: secs(2.0),
        };

        recorder.record_usage("topic", 10, secs(2.0), &ctx).await;
        recorder.record_content("topic", "text", metadata, &ctx).await;

        let warnings: Vec<String> = collector
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Warning { message } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Failed to track usage"));
        assert!(warnings[1].starts_with("Failed to store content"));
    }
}
