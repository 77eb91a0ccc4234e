//! Core domain for blogsmith.
//!
//! This crate contains every domain concept, value type, record, and error type
//! used throughout the blog generation pipeline, plus the port traits that
//! infrastructure crates implement. Infrastructure crates never add domain
//! rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PipelineRunId`, `ToolName`, `ModelName`) |
//! | [`types`] | Value types (`Stage`, `WordCount`, `GenerationTime`, `Timestamp`) |
//! | [`form`] | Submission form validation and the pipeline input bundle |
//! | [`progress`] | Request-scoped run context and progress events |
//! | [`search`] | Search aggregation and the `SearchProvider` port |
//! | [`tools`] | Tool registry and the web search tool |
//! | [`llm`] | The `LlmProvider` port and conversation types |
//! | [`history`] | Usage/content records, statistics, and the `HistoryStore` port |
//! | [`errors`] | Top-level run error |

pub mod errors;
pub mod form;
pub mod history;
pub mod identifiers;
pub mod llm;
pub mod progress;
pub mod search;
pub mod tools;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::BlogGenError;
pub use form::{BlogForm, BlogInputs, ValidationError};
pub use history::{
    ContentMetadata, ContentRecord, HistoryError, HistoryStore, UsageRecord, UsageStats,
};
pub use identifiers::{ModelName, PipelineRunId, ToolName};
pub use llm::{LlmError, LlmMessage, LlmProvider, LlmRequest, LlmResponse, ToolCall};
pub use progress::{CollectingReporter, NullReporter, ProgressEvent, ProgressReporter, RunContext};
pub use search::{
    make_snippet, SearchAggregator, SearchError, SearchProvider, SearchResponse, SearchResult,
    WikiPage, DEFAULT_MAX_RESULTS, SNIPPET_MAX_CHARS, TRUNCATION_MARKER,
};
pub use tools::{Tool, ToolError, ToolRegistry, ToolSpec, WebSearchTool, WEB_SEARCH_TOOL};
pub use types::{GenerationTime, Stage, Timestamp, WordCount};
