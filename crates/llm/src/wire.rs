//! Gemini `generateContent` request/response bodies.

use pipeline::{LlmError, LlmMessage, LlmRequest, LlmResponse, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

impl Content {
    fn new(role: &str, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts,
        }
    }
}

impl GenerateContentRequest {
    /// Translates a provider-neutral request into Gemini's wire format.
    ///
    /// Consecutive tool results are merged into a single `user` turn, which is
    /// how Gemini expects parallel function responses.
    pub(crate) fn from_request(request: &LlmRequest, temperature: Option<f32>) -> Self {
        let mut contents: Vec<Content> = Vec::with_capacity(request.messages.len());

        for message in &request.messages {
            match message {
                LlmMessage::User { text } => contents.push(Content::new("user", vec![Part::text(text)])),
                LlmMessage::Assistant { text } => {
                    contents.push(Content::new("model", vec![Part::text(text)]))
                }
                LlmMessage::ToolCalls { calls } => {
                    let parts = calls
                        .iter()
                        .map(|call| Part {
                            function_call: Some(FunctionCall {
                                name: call.name.clone(),
                                args: call.arguments.clone(),
                            }),
                            ..Part::default()
                        })
                        .collect();
                    contents.push(Content::new("model", parts));
                }
                LlmMessage::ToolResult { name, content } => {
                    let part = Part {
                        function_response: Some(FunctionResponse {
                            name: name.clone(),
                            response: as_object(content),
                        }),
                        ..Part::default()
                    };
                    match contents.last_mut() {
                        Some(last) if is_function_response_turn(last) => last.parts.push(part),
                        _ => contents.push(Content::new("user", vec![part])),
                    }
                }
            }
        }

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolDeclarations {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|spec| FunctionDeclaration {
                        name: spec.name.as_str().to_string(),
                        description: spec.description.clone(),
                        parameters: spec.input_schema.clone(),
                    })
                    .collect(),
            }]
        };

        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(&request.system)],
            },
            contents,
            tools,
            generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
        }
    }
}

fn is_function_response_turn(content: &Content) -> bool {
    content.role.as_deref() == Some("user")
        && !content.parts.is_empty()
        && content.parts.iter().all(|p| p.function_response.is_some())
}

/// Gemini requires function responses to be JSON objects.
fn as_object(value: &Value) -> Value {
    if value.is_object() {
        value.clone()
    } else {
        json!({ "result": value })
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    pub(crate) usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub(crate) prompt_token_count: u64,
    #[serde(default)]
    pub(crate) candidates_token_count: u64,
}

impl GenerateContentResponse {
    /// Interprets the first candidate: function calls win over text.
    pub(crate) fn into_response(self) -> Result<LlmResponse, LlmError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(LlmError::MalformedResponse(format!(
                "no candidates returned (blocked: {reason})"
            )));
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let calls: Vec<ToolCall> = parts
            .iter()
            .filter_map(|p| p.function_call.as_ref())
            .map(|call| ToolCall {
                name: call.name.clone(),
                arguments: call.args.clone(),
            })
            .collect();
        if !calls.is_empty() {
            return Ok(LlmResponse::ToolCalls(calls));
        }

        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(LlmError::MalformedResponse(format!(
                "candidate has no text (finish reason: {reason})"
            )));
        }
        Ok(LlmResponse::Text(text))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorEnvelope {
    pub(crate) error: GoogleError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleError {
    pub(crate) message: String,
}
