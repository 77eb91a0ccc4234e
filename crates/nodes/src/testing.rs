//! Hand-written fakes of the port traits for orchestration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pipeline::{
    ContentRecord, HistoryError, HistoryStore, LlmError, LlmProvider, LlmRequest, LlmResponse,
    SearchError, SearchProvider, UsageRecord, WikiPage,
};

/// Replays canned responses in order and records every request.
#[derive(Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Result<LlmResponse, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(LlmResponse::Text(t.to_string())))
                .collect(),
        )
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".into())))
    }
}

/// Search backend with a single fixed page per query.
pub struct StaticSearch;

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search_titles(&self, query: &str, _limit: usize) -> Result<Vec<String>, SearchError> {
        Ok(vec![query.to_string()])
    }

    async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, SearchError> {
        Ok(Some(WikiPage {
            title: title.to_string(),
            summary: format!("{title} is a well documented subject."),
            full_url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        }))
    }
}

/// In-memory history with switchable failures.
#[derive(Default)]
pub struct MemoryHistory {
    pub usage: Mutex<Vec<UsageRecord>>,
    pub content: Mutex<Vec<ContentRecord>>,
    pub fail_usage: bool,
    pub fail_content: bool,
}

impl MemoryHistory {
    fn failure(name: &str) -> HistoryError {
        HistoryError::Io {
            path: name.into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append_usage(&self, record: &UsageRecord) -> Result<(), HistoryError> {
        if self.fail_usage {
            return Err(Self::failure("usage_stats.json"));
        }
        self.usage.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn append_content(&self, record: &ContentRecord) -> Result<(), HistoryError> {
        if self.fail_content {
            return Err(Self::failure("generated_content.json"));
        }
        self.content.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn load_usage(&self) -> Result<Vec<UsageRecord>, HistoryError> {
        Ok(self.usage.lock().unwrap().clone())
    }

    async fn load_content(&self) -> Result<Vec<ContentRecord>, HistoryError> {
        Ok(self.content.lock().unwrap().clone())
    }
}
