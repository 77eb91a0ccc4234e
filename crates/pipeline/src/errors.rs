//! Top-level error type for a blog generation run.
//!
//! [`BlogGenError`] covers conditions that abort a run. Component-level errors
//! (search, LLM, history, tool and form validation failures) are defined in
//! their respective modules; only some of them are fatal.
//!
//! ## Fatality
//!
//! - Configuration errors stop the process before any work starts.
//! - Form validation errors reject a submission before any stage runs.
//! - Stage and LLM failures abort the run; no partial output is returned.
//! - Search failures never reach this type: the aggregator degrades to an
//!   empty result set.
//! - History failures never reach this type: they are reported as warnings.

use thiserror::Error;

use crate::{LlmError, Stage, ValidationError};

/// Errors that abort a blog generation run.
///
/// Every variant renders as a human-readable message suitable for showing to
/// the user unchanged.
#[derive(Debug, Error)]
pub enum BlogGenError {
    /// The runtime configuration is invalid (e.g. missing API key).
    ///
    /// Produced at start-up; no run is ever attempted with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The submitted form failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A pipeline stage could not produce its output.
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed {
        /// The stage that failed.
        stage: Stage,
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The LLM provider call behind a stage failed.
    #[error("Stage '{stage}' LLM call failed: {source}")]
    Llm {
        /// The stage whose LLM call failed.
        stage: Stage,
        /// The underlying provider error.
        #[source]
        source: LlmError,
    },
}

impl BlogGenError {
    /// Convenience constructor for [`BlogGenError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } | Self::Llm { stage, .. } => Some(*stage),
            Self::Configuration { .. } | Self::InvalidInput(_) => None,
        }
    }
}
