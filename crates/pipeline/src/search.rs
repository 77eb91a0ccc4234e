//! Search aggregation over an encyclopedia-style provider.
//!
//! The [`SearchAggregator`] turns a query into a uniform [`SearchResponse`]:
//! it asks the [`SearchProvider`] for candidate titles, loads each page,
//! truncates the lead summary into a snippet, and collects the hits in
//! provider relevance order.
//!
//! ## Failure semantics
//!
//! - A failed title search yields an empty response plus a warning.
//! - A page that does not exist is silently omitted.
//! - A page that fails to load is omitted and reported as
//!   [`ProgressEvent::SearchDegraded`] so degraded search quality is visible.
//!
//! The aggregator never returns an error; an empty `organic` list is a valid
//! (if unhelpful) outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{ProgressEvent, RunContext};

/// Maximum number of characters kept from a page summary.
pub const SNIPPET_MAX_CHARS: usize = 500;

/// Marker appended to every snippet.
pub const TRUNCATION_MARKER: &str = "...";

/// Candidate titles requested when the caller does not specify a limit.
pub const DEFAULT_MAX_RESULTS: usize = 3;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title as returned by the title search.
    pub title: String,
    /// Canonical page URL.
    pub link: String,
    /// Truncated lead summary followed by [`TRUNCATION_MARKER`].
    pub snippet: String,
}

/// Ordered search hits for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Hits in provider relevance order; no de-duplication.
    pub organic: Vec<SearchResult>,
}

impl SearchResponse {
    /// A response with no hits.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.organic.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Provider port
// ---------------------------------------------------------------------------

/// A page as loaded from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    /// Resolved page title (may differ from the requested one after redirects).
    pub title: String,
    /// Lead section as plain text.
    pub summary: String,
    /// Canonical page URL.
    pub full_url: String,
}

/// Errors reported by a [`SearchProvider`].
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent or the connection failed.
    #[error("search request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("search provider returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The provider's response could not be understood.
    #[error("unexpected search response: {0}")]
    MalformedResponse(String),

    /// The provider was configured with unusable settings.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
}

/// Port for the encyclopedia search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns up to `limit` candidate page titles for `query`, most relevant
    /// first.
    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError>;

    /// Loads a page by title. `Ok(None)` means the page does not exist.
    async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, SearchError>;
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Truncates `summary` to [`SNIPPET_MAX_CHARS`] characters and appends the
/// truncation marker.
pub fn make_snippet(summary: &str) -> String {
    let mut snippet: String = summary.chars().take(SNIPPET_MAX_CHARS).collect();
    snippet.push_str(TRUNCATION_MARKER);
    snippet
}

/// Aggregates provider results into a [`SearchResponse`].
pub struct SearchAggregator<P: ?Sized> {
    provider: std::sync::Arc<P>,
}

impl<P: SearchProvider + ?Sized> SearchAggregator<P> {
    /// Creates an aggregator over `provider`.
    pub fn new(provider: std::sync::Arc<P>) -> Self {
        Self { provider }
    }

    /// Searches for `query`, loading at most `max_results` candidate pages.
    #[instrument(skip(self, ctx), fields(run_id = %ctx.run_id()))]
    pub async fn search(&self, query: &str, max_results: usize, ctx: &RunContext) -> SearchResponse {
        let query = query.trim();
        if query.is_empty() || max_results == 0 {
            debug!("nothing to search for");
            return SearchResponse::empty();
        }

        ctx.report(ProgressEvent::Researching {
            query: query.to_string(),
        });

        let titles = match self.provider.search_titles(query, max_results).await {
            Ok(titles) => titles,
            Err(e) => {
                warn!(error = %e, "title search failed");
                ctx.warn(format!("Search error: {e}"));
                return SearchResponse::empty();
            }
        };

        let mut organic = Vec::with_capacity(titles.len());
        for title in titles.into_iter().take(max_results) {
            match self.provider.fetch_page(&title).await {
                Ok(Some(page)) => organic.push(SearchResult {
                    snippet: make_snippet(&page.summary),
                    link: page.full_url,
                    title,
                }),
                Ok(None) => debug!(%title, "page does not exist; skipped"),
                Err(e) => {
                    warn!(%title, error = %e, "page fetch failed; skipped");
                    ctx.report(ProgressEvent::SearchDegraded {
                        title,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let response = SearchResponse { organic };
        ctx.report(ProgressEvent::SearchResults {
            response: response.clone(),
        });
        response
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::CollectingReporter;

    enum PageFixture {
        Present(String),
        Missing,
        Broken,
    }

    #[derive(Default)]
    struct FakeProvider {
        titles: Option<Vec<String>>,
        pages: HashMap<String, PageFixture>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn with_titles(titles: &[&str]) -> Self {
            Self {
                titles: Some(titles.iter().map(|t| t.to_string()).collect()),
                ..Self::default()
            }
        }

        fn page(mut self, title: &str, fixture: PageFixture) -> Self {
            self.pages.insert(title.to_string(), fixture);
            self
        }
    }

    #[async_trait]
    impl SearchProvider for FakeProvider {
        async fn search_titles(&self, _query: &str, limit: usize) -> Result<Vec<String>, SearchError> {
            match &self.titles {
                Some(titles) => Ok(titles.iter().take(limit).cloned().collect()),
                None => Err(SearchError::Transport("connection refused".into())),
            }
        }

        async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, SearchError> {
            self.fetched.lock().unwrap().push(title.to_string());
            match self.pages.get(title) {
                Some(PageFixture::Present(summary)) => Ok(Some(WikiPage {
                    title: title.to_string(),
                    summary: summary.clone(),
                    full_url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
                })),
                Some(PageFixture::Broken) => Err(SearchError::Http {
                    status: 500,
                    message: "boom".into(),
                }),
                Some(PageFixture::Missing) | None => Ok(None),
            }
        }
    }

    fn aggregator(provider: FakeProvider) -> SearchAggregator<FakeProvider> {
        SearchAggregator::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn zero_titles_yield_empty_response() {
        let agg = aggregator(FakeProvider::with_titles(&[]));
        let response = agg.search("anything", 3, &RunContext::detached()).await;
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn missing_pages_are_omitted_silently() {
        let provider = FakeProvider::with_titles(&["A", "B"])
            .page("A", PageFixture::Missing)
            .page("B", PageFixture::Missing);
        let collector = Arc::new(CollectingReporter::new());
        let ctx = RunContext::new(collector.clone());

        let response = aggregator(provider).search("query", 3, &ctx).await;

        assert!(response.is_empty());
        assert!(!collector
            .events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::SearchDegraded { .. })));
    }

    #[tokio::test]
    async fn hits_keep_provider_order_and_canonical_links() {
        let provider = FakeProvider::with_titles(&["Solar power", "Photovoltaics"])
            .page("Solar power", PageFixture::Present("Solar power is...".into()))
            .page("Photovoltaics", PageFixture::Present("PV converts light.".into()));

        let response = aggregator(provider)
            .search("solar", 3, &RunContext::detached())
            .await;

        let titles: Vec<&str> = response.organic.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Solar power", "Photovoltaics"]);
        assert_eq!(
            response.organic[0].link,
            "https://en.wikipedia.org/wiki/Solar_power"
        );
        assert_eq!(response.organic[1].snippet, "PV converts light....");
    }

    #[tokio::test]
    async fn long_summaries_are_cut_at_500_characters() {
        let long: String = "é".repeat(800);
        let provider =
            FakeProvider::with_titles(&["Long"]).page("Long", PageFixture::Present(long.clone()));

        let response = aggregator(provider).search("long", 3, &RunContext::detached()).await;

        let snippet = &response.organic[0].snippet;
        let body = snippet.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.chars().count(), SNIPPET_MAX_CHARS);
        assert_eq!(body, long.chars().take(SNIPPET_MAX_CHARS).collect::<String>());
    }

    #[tokio::test]
    async fn broken_pages_are_skipped_and_reported() {
        let provider = FakeProvider::with_titles(&["Good", "Bad", "Also good"])
            .page("Good", PageFixture::Present("one".into()))
            .page("Bad", PageFixture::Broken)
            .page("Also good", PageFixture::Present("two".into()));
        let collector = Arc::new(CollectingReporter::new());
        let ctx = RunContext::new(collector.clone());

        let response = aggregator(provider).search("q", 3, &ctx).await;

        assert_eq!(response.organic.len(), 2);
        assert!(collector.events().iter().any(|e| matches!(
            e,
            ProgressEvent::SearchDegraded { title, .. } if title == "Bad"
        )));
    }

    #[tokio::test]
    async fn title_search_failure_returns_empty_and_warns() {
        let provider = FakeProvider::default();
        let collector = Arc::new(CollectingReporter::new());
        let ctx = RunContext::new(collector.clone());

        let response = aggregator(provider).search("q", 3, &ctx).await;

        assert!(response.is_empty());
        assert!(collector
            .events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Warning { message } if message.contains("Search error"))));
    }

    #[tokio::test]
    async fn blank_query_never_reaches_the_provider() {
        let provider = Arc::new(FakeProvider::with_titles(&["A"]).page("A", PageFixture::Present("x".into())));
        let agg = SearchAggregator::new(provider.clone());

        let response = agg.search("   ", 3, &RunContext::detached()).await;

        assert!(response.is_empty());
        assert!(provider.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn max_results_bounds_candidate_titles() {
        let provider = Arc::new(
            FakeProvider::with_titles(&["A", "B", "C", "D"])
                .page("A", PageFixture::Present("a".into()))
                .page("B", PageFixture::Present("b".into()))
                .page("C", PageFixture::Present("c".into()))
                .page("D", PageFixture::Present("d".into())),
        );
        let agg = SearchAggregator::new(provider.clone());

        let response = agg.search("q", 2, &RunContext::detached()).await;

        assert_eq!(response.organic.len(), 2);
        assert_eq!(provider.fetched.lock().unwrap().len(), 2);
    }
}
