//! LLM gateway: one agent turn with an optional tool-calling loop.
//!
//! The gateway sends the stage's system instruction and task to the provider.
//! When the model asks for tools, each call is executed through the stage's
//! [`ToolRegistry`], the results are appended to the conversation, and the
//! model is prompted again. Tool failures are fed back to the model; they do
//! not fail the stage.

use std::sync::Arc;

use pipeline::{
    BlogGenError, LlmMessage, LlmProvider, LlmRequest, LlmResponse, RunContext, Stage,
    ToolRegistry,
};
use tracing::{debug, info, warn};

/// Tool rounds allowed per stage when not configured otherwise.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Wraps an [`LlmProvider`] with the tool-calling loop.
#[derive(Clone)]
pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    max_tool_rounds: usize,
}

impl LlmGateway {
    /// Creates a gateway allowing [`DEFAULT_MAX_TOOL_ROUNDS`] tool rounds.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Overrides the number of tool rounds allowed per stage.
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Runs one agent turn for `stage` and returns its final text.
    ///
    /// Fails if the provider fails, if the model keeps calling tools beyond the
    /// round limit, or if the final text is blank.
    pub async fn run_agent(
        &self,
        stage: Stage,
        system: String,
        task: String,
        tools: &ToolRegistry,
        ctx: &RunContext,
    ) -> Result<String, BlogGenError> {
        let specs = tools.specs();
        let mut messages = vec![LlmMessage::user(task)];
        let mut rounds = 0;

        loop {
            let request = LlmRequest {
                system: system.clone(),
                messages: messages.clone(),
                tools: specs.clone(),
            };
            debug!(%stage, turns = messages.len(), "calling LLM");

            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|source| BlogGenError::Llm { stage, source })?;

            let calls = match response {
                LlmResponse::Text(text) => {
                    if text.trim().is_empty() {
                        return Err(BlogGenError::StageFailed {
                            stage,
                            reason: "the model returned no output".to_string(),
                        });
                    }
                    return Ok(text);
                }
                LlmResponse::ToolCalls(calls) if calls.is_empty() => {
                    return Err(BlogGenError::StageFailed {
                        stage,
                        reason: "the model returned an empty tool call list".to_string(),
                    });
                }
                LlmResponse::ToolCalls(calls) => calls,
            };

            if rounds == self.max_tool_rounds {
                return Err(BlogGenError::StageFailed {
                    stage,
                    reason: format!(
                        "the model was still calling tools after {} rounds",
                        self.max_tool_rounds
                    ),
                });
            }
            rounds += 1;

            messages.push(LlmMessage::ToolCalls {
                calls: calls.clone(),
            });
            for call in calls {
                info!(%stage, tool = %call.name, "invoking tool");
                let content = match tools.invoke(&call.name, call.arguments, ctx).await {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(%stage, tool = %call.name, error = %e, "tool call failed");
                        e.to_value()
                    }
                };
                messages.push(LlmMessage::ToolResult {
                    name: call.name,
                    content,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pipeline::{LlmError, ToolCall, WebSearchTool, WEB_SEARCH_TOOL};
    use serde_json::json;

    use super::*;
    use crate::testing::{ScriptedLlm, StaticSearch};

    fn search_tools() -> ToolRegistry {
        ToolRegistry::new().with(Arc::new(WebSearchTool::new(Arc::new(StaticSearch))))
    }

    fn search_call(query: &str) -> LlmResponse {
        LlmResponse::ToolCalls(vec![ToolCall {
            name: WEB_SEARCH_TOOL.into(),
            arguments: json!({ "query": query }),
        }])
    }

    async fn run(llm: Arc<ScriptedLlm>, tools: &ToolRegistry, rounds: usize) -> Result<String, BlogGenError> {
        LlmGateway::new(llm)
            .with_max_tool_rounds(rounds)
            .run_agent(Stage::Plan, "sys".into(), "task".into(), tools, &RunContext::detached())
            .await
    }

    #[tokio::test]
    async fn plain_text_is_returned_directly() {
        let llm = Arc::new(ScriptedLlm::texts(&["the plan"]));
        let text = run(llm.clone(), &ToolRegistry::new(), 5).await.unwrap();
        assert_eq!(text, "the plan");
        assert_eq!(llm.requests().len(), 1);
        assert!(llm.requests()[0].tools.is_empty());
    }

    #[tokio::test]
    async fn tool_results_are_fed_back_before_final_text() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(search_call("Solar power")),
            Ok(LlmResponse::Text("plan with research".into())),
        ]));

        let text = run(llm.clone(), &search_tools(), 5).await.unwrap();

        assert_eq!(text, "plan with research");
        let second = &llm.requests()[1];
        assert_eq!(second.messages.len(), 3);
        match &second.messages[2] {
            LlmMessage::ToolResult { name, content } => {
                assert_eq!(name, WEB_SEARCH_TOOL);
                assert_eq!(content["organic"][0]["title"], "Solar power");
            }
            other => panic!("expected a tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tool_errors_go_back_to_the_model() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(LlmResponse::ToolCalls(vec![ToolCall {
                name: "calculator".into(),
                arguments: json!({}),
            }])),
            Ok(LlmResponse::Text("done anyway".into())),
        ]));

        let text = run(llm.clone(), &search_tools(), 5).await.unwrap();

        assert_eq!(text, "done anyway");
        match &llm.requests()[1].messages[2] {
            LlmMessage::ToolResult { content, .. } => {
                assert_eq!(content["error"], "unknown tool 'calculator'");
            }
            other => panic!("expected a tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn endless_tool_calls_fail_the_stage() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(search_call("a")),
            Ok(search_call("b")),
            Ok(search_call("c")),
        ]));

        let err = run(llm, &search_tools(), 2).await.unwrap_err();

        assert!(matches!(err, BlogGenError::StageFailed { stage: Stage::Plan, .. }));
    }

    #[tokio::test]
    async fn blank_output_fails_the_stage() {
        let llm = Arc::new(ScriptedLlm::texts(&["  \n"]));
        let err = run(llm, &ToolRegistry::new(), 5).await.unwrap_err();
        assert!(matches!(err, BlogGenError::StageFailed { .. }));
    }

    #[tokio::test]
    async fn provider_errors_are_attributed_to_the_stage() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(LlmError::Api {
            status: 429,
            message: "quota".into(),
        })]));
        let err = run(llm, &ToolRegistry::new(), 5).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Plan));
        assert!(err.to_string().contains("quota"));
    }
}
