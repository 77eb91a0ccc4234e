//! Blogsmith encyclopedia search adapter.
//!
//! Implements the [`pipeline::SearchProvider`] trait over the MediaWiki Action
//! API, as served by Wikipedia.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL construction, HTTP transport, and response parsing
//! live here. The [`pipeline`] crate sees only [`pipeline::SearchProvider`].
//!
//! ## Endpoints
//!
//! Both operations are `GET {base_url}/w/api.php` with `formatversion=2`:
//!
//! - title search: `action=query&list=search&srsearch=<query>&srlimit=<n>`
//! - page load: `action=query&prop=extracts|info&exintro=1&explaintext=1&inprop=url&redirects=1&titles=<title>`
//!
//! A page flagged `missing` or `invalid` does not exist.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{SearchError, SearchProvider, WikiPage};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Identifies this client to Wikipedia, which rejects anonymous agents.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "blogsmith/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/blogsmith/blogsmith)"
);

const API_PATH: &str = "/w/api.php";

/// Connection settings for [`WikipediaProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikipediaConfig {
    /// Scheme and host, e.g. `https://en.wikipedia.org`.
    pub base_url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl WikipediaConfig {
    /// Settings for the Wikipedia edition in `language` (e.g. `"en"`).
    pub fn for_language(language: &str) -> Self {
        Self {
            base_url: format!("https://{language}.wikipedia.org"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self::for_language("en")
    }
}

/// [`SearchProvider`] backed by the MediaWiki Action API.
#[derive(Debug, Clone)]
pub struct WikipediaProvider {
    client: Client,
    endpoint: Url,
}

impl WikipediaProvider {
    /// Builds a provider from `config`.
    pub fn new(config: WikipediaConfig) -> Result<Self, SearchError> {
        let endpoint = Url::parse(config.base_url.trim_end_matches('/'))
            .and_then(|base| base.join(API_PATH))
            .map_err(|e| SearchError::InvalidConfig(format!("base URL '{}': {e}", config.base_url)))?;
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    async fn query<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<Option<T>, SearchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("format", "json")
            .append_pair("formatversion", "2")
            .extend_pairs(params.iter().copied());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(SearchError::MalformedResponse(format!(
                "provider error {}: {}",
                error.code, error.info
            )));
        }
        Ok(envelope.query)
    }
}

#[async_trait]
impl SearchProvider for WikipediaProvider {
    #[instrument(skip(self))]
    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        let limit = limit.to_string();
        let result: Option<SearchQuery> = self
            .query(&[
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit),
                ("srprop", ""),
            ])
            .await?;

        let titles: Vec<String> = result
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default();
        debug!(count = titles.len(), "titles found");
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, title: &str) -> Result<Option<WikiPage>, SearchError> {
        let result: Option<PagesQuery> = self
            .query(&[
                ("prop", "extracts|info"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        let Some(page) = result.and_then(|q| q.pages.into_iter().next()) else {
            return Ok(None);
        };
        if page.missing || page.invalid {
            return Ok(None);
        }
        let full_url = page.fullurl.ok_or_else(|| {
            SearchError::MalformedResponse(format!("page '{}' has no URL", page.title))
        })?;

        Ok(Some(WikiPage {
            title: page.title,
            summary: page.extract,
            full_url,
        }))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    query: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: String,
    fullurl: Option<String>,
}
