//! Tool registry for agent-callable capabilities.
//!
//! A tool is a named capability record: name, description, JSON input schema,
//! and a handler. Tools are registered explicitly in a [`ToolRegistry`] that is
//! handed to the stages allowed to use it; nothing is registered globally.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{RunContext, SearchAggregator, SearchProvider, ToolName, DEFAULT_MAX_RESULTS};

/// Description of a tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name.
    pub name: ToolName,
    /// Natural-language description shown to the model.
    pub description: String,
    /// JSON schema of the argument object.
    pub input_schema: Value,
}

/// Errors produced while invoking a tool.
///
/// These are fed back to the model as tool results; they never abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// The arguments do not match the tool's input schema.
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// What was wrong.
        reason: String,
    },

    /// The tool ran but could not produce a result.
    #[error("tool '{tool}' failed: {reason}")]
    Failed {
        /// Tool name.
        tool: String,
        /// What went wrong.
        reason: String,
    },
}

impl ToolError {
    /// JSON form fed back to the model.
    pub fn to_value(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// A capability the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Advertised name, description and schema.
    fn spec(&self) -> ToolSpec;

    /// Executes the tool with a JSON argument object.
    async fn invoke(&self, arguments: Value, ctx: &RunContext) -> Result<Value, ToolError>;
}

/// Explicit set of tools available to a stage.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tool`, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.spec().name.as_str().to_string();
        self.tools.insert(name, tool);
    }

    /// Builder-style [`ToolRegistry::register`].
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Returns `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Specs of all registered tools, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    /// Invokes the tool called `name`.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Value,
        ctx: &RunContext,
    ) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.invoke(arguments, ctx).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tools.keys()).finish()
    }
}

// ---------------------------------------------------------------------------
// Web search tool
// ---------------------------------------------------------------------------

/// Name under which the search tool is registered.
pub const WEB_SEARCH_TOOL: &str = "web_search";

const WEB_SEARCH_DESCRIPTION: &str = "Searches the web for articles and information based on \
the provided query. Input should be a specific search query string.";

/// Exposes a [`SearchAggregator`] to the model.
pub struct WebSearchTool<P: ?Sized> {
    aggregator: SearchAggregator<P>,
    max_results: usize,
}

impl<P: SearchProvider + ?Sized> WebSearchTool<P> {
    /// Wraps `provider` with the default result limit.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            aggregator: SearchAggregator::new(provider),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Overrides the number of candidate titles per query.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[async_trait]
impl<P: SearchProvider + ?Sized + 'static> Tool for WebSearchTool<P> {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::from_static(WEB_SEARCH_TOOL),
            description: WEB_SEARCH_DESCRIPTION.to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "A specific search query."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn invoke(&self, arguments: Value, ctx: &RunContext) -> Result<Value, ToolError> {
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ToolError::InvalidArguments {
                tool: WEB_SEARCH_TOOL.to_string(),
                reason: "'query' must be a non-empty string".to_string(),
            })?;

        let response = self.aggregator.search(query, self.max_results, ctx).await;
        serde_json::to_value(&response).map_err(|e| ToolError::Failed {
            tool: WEB_SEARCH_TOOL.to_string(),
            reason: e.to_string(),
        })
    }
}
