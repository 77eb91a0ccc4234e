//! Blogsmith CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: `.env`, then flags with environment fallbacks,
//!    validated into an [`config::AppConfig`] before anything is built.
//! 2. **Wire observability**: `tracing-subscriber` to stderr, plus an optional
//!    OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: [`llm::GeminiProvider`],
//!    [`search::WikipediaProvider`] and [`history::JsonFileHistory`], injected
//!    into a [`nodes::BlogGenerator`].
//! 4. **Run the command**: `generate` writes the post to stdout and to a
//!    Markdown file; `stats` summarises the usage log.

mod cli;
mod config;
mod observability;
mod reporter;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use history::JsonFileHistory;
use llm::{GeminiConfig, GeminiProvider};
use nodes::{BlogGenerator, HistoryRecorder, LlmGateway, PipelineRunner};
use pipeline::{HistoryStore, RunContext, ToolRegistry, UsageRecord, UsageStats, WebSearchTool};
use search::{WikipediaConfig, WikipediaProvider};
use tracing::info;

use crate::cli::{Cli, Command, GenerateArgs};
use crate::config::AppConfig;
use crate::reporter::TerminalReporter;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli).await;
    telemetry.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate(args) => generate(args, cli.history_dir).await,
        Command::Stats => stats(&cli.history_dir).await,
    }
}

async fn generate(args: GenerateArgs, history_dir: PathBuf) -> anyhow::Result<()> {
    let config = AppConfig::from_args(&args, history_dir)?;
    info!(?config, "configuration loaded");

    let search = Arc::new(WikipediaProvider::new(WikipediaConfig::for_language(&config.wiki_lang))?);
    let llm = Arc::new(GeminiProvider::new(GeminiConfig::new(
        config.api_key.clone(),
        config.model.clone(),
    ))?);

    let tools = ToolRegistry::new().with(Arc::new(WebSearchTool::new(search)));
    let runner = PipelineRunner::new(
        LlmGateway::new(llm).with_max_tool_rounds(config.max_tool_rounds),
        tools,
    );
    let recorder = HistoryRecorder::new(Arc::new(JsonFileHistory::in_dir(&config.history_dir)));
    let generator = BlogGenerator::new(runner, recorder);

    let ctx = RunContext::new(Arc::new(TerminalReporter::new(args.verbose)));
    let post = generator.generate(&args.form(), &ctx).await?;

    let path = save_post(&config.output_dir, &post.download_file_name(), post.content()).await?;
    println!("{}", post.content());
    eprintln!("{}", serde_json::to_string_pretty(&post.summary())?);
    eprintln!("Saved to {}", path.display());
    Ok(())
}

async fn save_post(dir: &Path, file_name: &str, content: &str) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(path)
}

async fn stats(history_dir: &Path) -> anyhow::Result<()> {
    let store = JsonFileHistory::in_dir(history_dir);
    let records = store.load_usage().await?;
    println!("{}", render_stats(&records));
    Ok(())
}

fn render_stats(records: &[UsageRecord]) -> String {
    if records.is_empty() {
        return "No usage recorded yet.".to_string();
    }

    let stats = UsageStats::from_records(records);
    let mut out = format!(
        "Runs: {}\nAverage generation time: {:.2} seconds\nTotal generation time: {:.2} seconds\n\
         Average content length: {:.0} characters\nLongest content: {} characters\n",
        stats.runs,
        stats.average_generation_secs,
        stats.total_generation_secs,
        stats.average_content_length,
        stats.max_content_length,
    );
    if let (Some(first), Some(last)) = (stats.first, stats.last) {
        out.push_str(&format!(
            "First run: {}\nLast run: {}\n",
            first.format_local("%Y-%m-%d %H:%M:%S"),
            last.format_local("%Y-%m-%d %H:%M:%S"),
        ));
    }

    out.push_str("\nTrend:\n");
    for record in records {
        out.push_str(&format!(
            "{}  {:>8.2}s  {:>7} chars  {}\n",
            record.timestamp.format_local("%Y-%m-%d %H:%M:%S"),
            record.generation_time.as_secs_f64(),
            record.content_length,
            record.topic,
        ));
    }
    out
}
