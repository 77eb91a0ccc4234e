//! Progress output for an interactive terminal.

use std::io::Write;

use pipeline::{ProgressEvent, ProgressReporter};

/// Prints progress lines to stderr.
#[derive(Debug, Default)]
pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    /// `verbose` also echoes each stage's full output.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for TerminalReporter {
    fn report(&self, event: ProgressEvent) {
        let line = render(&event, self.verbose);
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }
}

fn render(event: &ProgressEvent, verbose: bool) -> String {
    let percent = event
        .percent()
        .map(|p| format!("[{p:>3}%] "))
        .unwrap_or_else(|| "       ".to_string());
    let body = match event {
        ProgressEvent::RunStarted => "Starting blog generation...".to_string(),
        ProgressEvent::StageStarted { stage } => format!("{}...", stage.label()),
        ProgressEvent::StageCompleted { stage, output } if verbose => {
            format!("{} finished:\n{output}", stage.label())
        }
        ProgressEvent::StageCompleted { stage, .. } => format!("{} finished", stage.label()),
        ProgressEvent::Researching { query } => format!("Researching: {query}"),
        ProgressEvent::SearchResults { response } => {
            format!("Found {} encyclopedia result(s)", response.organic.len())
        }
        ProgressEvent::SearchDegraded { title, reason } => {
            format!("Skipped '{title}': {reason}")
        }
        ProgressEvent::Warning { message } => format!("Warning: {message}"),
        ProgressEvent::RunCompleted => "Blog post generated".to_string(),
    };
    format!("{percent}{body}")
}
