//! The three-stage pipeline runner: plan, write, edit.
//!
//! Stages run strictly in order. Each stage after the first receives the
//! previous stage's output as context. Only the planning stage sees the tool
//! registry. Any stage failure aborts the run and no partial output is
//! returned.

use pipeline::{BlogGenError, BlogInputs, ProgressEvent, RunContext, Stage, ToolRegistry};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};

use crate::gateway::LlmGateway;
use crate::stages::{system_instruction, task_message};

/// The three ordered text artefacts of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Content strategy from the planning stage.
    pub plan: String,
    /// First draft from the writing stage.
    pub draft: String,
    /// Edited article; the deliverable.
    pub edited: String,
}

impl PipelineOutput {
    /// The user-facing deliverable.
    pub fn final_text(&self) -> &str {
        &self.edited
    }

    /// The output of one stage.
    pub fn stage_output(&self, stage: Stage) -> &str {
        match stage {
            Stage::Plan => &self.plan,
            Stage::Write => &self.draft,
            Stage::Edit => &self.edited,
        }
    }
}

/// Runs the plan → write → edit sequence.
#[derive(Clone)]
pub struct PipelineRunner {
    gateway: LlmGateway,
    planning_tools: ToolRegistry,
}

impl PipelineRunner {
    /// Creates a runner; `planning_tools` is offered to the planning stage only.
    pub fn new(gateway: LlmGateway, planning_tools: ToolRegistry) -> Self {
        Self {
            gateway,
            planning_tools,
        }
    }

    /// Runs all three stages over `inputs`.
    pub async fn run(
        &self,
        inputs: &BlogInputs,
        ctx: &RunContext,
    ) -> Result<PipelineOutput, BlogGenError> {
        ctx.report(ProgressEvent::RunStarted);

        let plan = self.run_stage(Stage::Plan, inputs, None, ctx).await?;
        let draft = self.run_stage(Stage::Write, inputs, Some(&plan), ctx).await?;
        let edited = self.run_stage(Stage::Edit, inputs, Some(&draft), ctx).await?;

        ctx.report(ProgressEvent::RunCompleted);
        Ok(PipelineOutput {
            plan,
            draft,
            edited,
        })
    }

    async fn run_stage(
        &self,
        stage: Stage,
        inputs: &BlogInputs,
        context: Option<&str>,
        ctx: &RunContext,
    ) -> Result<String, BlogGenError> {
        let span = info_span!("stage", run_id = %ctx.run_id(), %stage);
        async {
            ctx.report(ProgressEvent::StageStarted { stage });

            let empty = ToolRegistry::new();
            let tools = match stage {
                Stage::Plan => &self.planning_tools,
                Stage::Write | Stage::Edit => &empty,
            };
            let output = self
                .gateway
                .run_agent(
                    stage,
                    system_instruction(stage, inputs),
                    task_message(stage, inputs, context),
                    tools,
                    ctx,
                )
                .await?;

            info!(chars = output.chars().count(), "stage completed");
            ctx.report(ProgressEvent::StageCompleted {
                stage,
                output: output.clone(),
            });
            Ok::<_, BlogGenError>(output)
        }
        .instrument(span)
        .await
    }
}
