//! Submission flow: validate → run the pipeline → record history.

use std::time::Instant;

use pipeline::{
    BlogForm, BlogGenError, BlogInputs, ContentMetadata, GenerationTime, RunContext, Timestamp,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::recorder::HistoryRecorder;
use crate::runner::{PipelineOutput, PipelineRunner};

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct GeneratedPost {
    /// The validated inputs the run used.
    pub inputs: BlogInputs,
    /// All three stage outputs.
    pub output: PipelineOutput,
    /// Wall-clock time from submission to the edited text.
    pub generation_time: GenerationTime,
    /// When generation finished.
    pub created_at: Timestamp,
}

impl GeneratedPost {
    /// The Markdown deliverable.
    pub fn content(&self) -> &str {
        self.output.final_text()
    }

    /// Character count of the deliverable.
    pub fn content_length(&self) -> usize {
        self.content().chars().count()
    }

    /// File name offered for download, e.g. `blog_post_20240501_120000.md`.
    pub fn download_file_name(&self) -> String {
        format!("blog_post_{}.md", self.created_at.format_local("%Y%m%d_%H%M%S"))
    }

    /// Metadata shown next to the finished post.
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            topic: self.inputs.topic.clone(),
            keywords: self.inputs.keywords.clone(),
            word_count: self.inputs.length.as_u32(),
            generation_date: self.created_at.format_local("%Y-%m-%d %H:%M:%S"),
            key_points: self.inputs.bullet_points.len(),
            content_length: self.content_length(),
            generation_time: self.generation_time.to_string(),
        }
    }
}

/// Display metadata for a generated post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    /// Topic of the post.
    #[serde(rename = "Topic")]
    pub topic: String,
    /// Normalised keywords.
    #[serde(rename = "Keywords")]
    pub keywords: Vec<String>,
    /// Requested length in words.
    #[serde(rename = "Word Count")]
    pub word_count: u32,
    /// Local creation time, `%Y-%m-%d %H:%M:%S`.
    #[serde(rename = "Generation Date")]
    pub generation_date: String,
    /// Number of key points covered.
    #[serde(rename = "Number of Key Points")]
    pub key_points: usize,
    /// Character count of the post.
    #[serde(rename = "Content Length")]
    pub content_length: usize,
    /// Generation time, e.g. `12.34 seconds`.
    #[serde(rename = "Generation Time")]
    pub generation_time: String,
}

/// Turns a form submission into a finished, recorded post.
#[derive(Clone)]
pub struct BlogGenerator {
    runner: PipelineRunner,
    recorder: HistoryRecorder,
}

impl BlogGenerator {
    /// Creates a generator from its collaborators.
    pub fn new(runner: PipelineRunner, recorder: HistoryRecorder) -> Self {
        Self { runner, recorder }
    }

    /// Validates `form`, runs the pipeline, and records usage and content.
    ///
    /// Validation failures are returned before any stage runs. Recording is
    /// best effort and never turns a successful run into a failure.
    #[instrument(skip_all, fields(run_id = %ctx.run_id()))]
    pub async fn generate(&self, form: &BlogForm, ctx: &RunContext) -> Result<GeneratedPost, BlogGenError> {
        let inputs = form.validate()?;
        info!(topic = %inputs.topic, length = %inputs.length, "starting generation");

        let started = Instant::now();
        let output = self.runner.run(&inputs, ctx).await?;
        let generation_time = GenerationTime::from_duration(started.elapsed());

        let post = GeneratedPost {
            inputs,
            output,
            generation_time,
            created_at: Timestamp::now(),
        };

        self.recorder
            .record_usage(&post.inputs.topic, post.content_length(), generation_time, ctx)
            .await;
        self.recorder
            .record_content(
                &post.inputs.topic,
                post.content(),
                ContentMetadata::from_inputs(&post.inputs, generation_time),
                ctx,
            )
            .await;

        info!(chars = post.content_length(), secs = generation_time.as_secs_f64(), "generation finished");
        Ok(post)
    }
}
