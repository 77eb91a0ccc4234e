//! Blogsmith pipeline stages, LLM gateway, and submission flow.
//!
//! This crate provides the three stage definitions (plan, write, edit), the
//! LLM gateway that runs one agent turn including the tool-calling loop, the
//! [`PipelineRunner`] that sequences the stages, the best-effort
//! [`HistoryRecorder`], and the [`BlogGenerator`] that ties a form submission
//! to a finished, recorded post.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** This crate sequences calls between business logic
//! in the [`pipeline`] crate and its port traits (LLM, search, history). It
//! performs no I/O of its own.

pub mod gateway;
pub mod generator;
pub mod recorder;
pub mod runner;
pub mod stages;

#[cfg(test)]
mod testing;

pub use gateway::{LlmGateway, DEFAULT_MAX_TOOL_ROUNDS};
pub use generator::{BlogGenerator, GeneratedPost, PostSummary};
pub use recorder::HistoryRecorder;
pub use runner::{PipelineOutput, PipelineRunner};
pub use stages::{prompt_for, StagePrompt};
