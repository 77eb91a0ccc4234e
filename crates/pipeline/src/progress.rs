//! Request-scoped run context and progress reporting.
//!
//! A [`RunContext`] is created per submission and passed explicitly through the
//! runner, the tools, and the history recorder. Observers implement
//! [`ProgressReporter`]; reporting is fire-and-forget and never affects the
//! outcome of a run.

use std::sync::{Arc, Mutex};

use crate::{PipelineRunId, SearchResponse, Stage};

/// Human-readable progress notifications emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The run has started (progress 10%).
    RunStarted,
    /// A stage is about to call the LLM.
    StageStarted {
        /// The stage starting.
        stage: Stage,
    },
    /// A stage produced its output.
    StageCompleted {
        /// The stage that finished.
        stage: Stage,
        /// The stage's text output.
        output: String,
    },
    /// The search tool is researching a query.
    Researching {
        /// The query being researched.
        query: String,
    },
    /// The search tool finished a query.
    SearchResults {
        /// The aggregated response returned to the model.
        response: SearchResponse,
    },
    /// A single search hit could not be loaded and was omitted.
    SearchDegraded {
        /// Title of the page that failed.
        title: String,
        /// Why it failed.
        reason: String,
    },
    /// A non-fatal problem the user should know about.
    Warning {
        /// Human-readable description.
        message: String,
    },
    /// All stages finished.
    RunCompleted,
}

impl ProgressEvent {
    /// Overall progress (percent) implied by this event, if it marks a milestone.
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::RunStarted => Some(10),
            Self::StageCompleted { stage, .. } => Some(stage.completed_percent()),
            Self::RunCompleted => Some(100),
            _ => None,
        }
    }
}

/// Observer of [`ProgressEvent`]s.
pub trait ProgressReporter: Send + Sync {
    /// Receives one event. Must not block for long.
    fn report(&self, event: ProgressEvent);
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _event: ProgressEvent) {}
}

/// Reporter that keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingReporter {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all events received so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressReporter for CollectingReporter {
    fn report(&self, event: ProgressEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Everything scoped to one submission.
#[derive(Clone)]
pub struct RunContext {
    run_id: PipelineRunId,
    reporter: Arc<dyn ProgressReporter>,
}

impl RunContext {
    /// Creates a context with a fresh run id.
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            run_id: PipelineRunId::new_random(),
            reporter,
        }
    }

    /// Creates a context whose events go nowhere.
    pub fn detached() -> Self {
        Self::new(Arc::new(NullReporter))
    }

    /// The run this context belongs to.
    pub fn run_id(&self) -> PipelineRunId {
        self.run_id
    }

    /// Forwards an event to the reporter.
    pub fn report(&self, event: ProgressEvent) {
        self.reporter.report(event);
    }

    /// Shorthand for reporting a [`ProgressEvent::Warning`].
    pub fn warn(&self, message: impl Into<String>) {
        self.report(ProgressEvent::Warning {
            message: message.into(),
        });
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}
