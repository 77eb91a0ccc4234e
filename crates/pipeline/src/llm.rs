//! LLM provider port.
//!
//! The orchestration layer speaks to language models only through
//! [`LlmProvider`]. A request carries the full conversation so far; a response
//! is either final text or a batch of tool calls the caller must execute and
//! feed back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ToolSpec;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON object of arguments.
    pub arguments: Value,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LlmMessage {
    /// Text supplied by the caller.
    User {
        /// Message text.
        text: String,
    },
    /// Text previously produced by the model.
    Assistant {
        /// Message text.
        text: String,
    },
    /// Tool calls previously requested by the model.
    ToolCalls {
        /// The calls, in the order the model requested them.
        calls: Vec<ToolCall>,
    },
    /// The result of executing one tool call.
    ToolResult {
        /// Name of the tool that produced the result.
        name: String,
        /// JSON result (or an `{"error": ...}` object).
        content: Value,
    },
}

impl LlmMessage {
    /// Shorthand for a [`LlmMessage::User`] message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// System instruction (role, goal and backstory of the agent).
    pub system: String,
    /// Conversation so far, oldest first. Never empty.
    pub messages: Vec<LlmMessage>,
    /// Tools the model may call in this turn. Empty disables tool use.
    pub tools: Vec<ToolSpec>,
}

/// The model's answer to an [`LlmRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LlmResponse {
    /// Final text for this turn.
    Text(String),
    /// The model wants these tools executed before it continues.
    ToolCalls(Vec<ToolCall>),
}

/// Errors reported by an [`LlmProvider`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request could not be sent or the connection failed.
    #[error("LLM request failed: {0}")]
    Transport(String),

    /// The provider rejected the request.
    #[error("LLM provider returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// The provider's answer could not be interpreted.
    #[error("malformed LLM response: {0}")]
    MalformedResponse(String),

    /// The provider was configured with unusable settings.
    #[error("invalid LLM configuration: {0}")]
    InvalidConfig(String),
}

/// Port for LLM inference backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Runs one completion turn.
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}
