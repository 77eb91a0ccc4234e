//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nodes::DEFAULT_MAX_TOOL_ROUNDS;
use pipeline::BlogForm;

/// Generate researched blog posts with a plan → write → edit LLM pipeline.
#[derive(Debug, Parser)]
#[command(name = "blogsmith", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding usage_stats.json and generated_content.json.
    #[arg(long, global = true, env = "BLOGSMITH_HISTORY_DIR", default_value = ".")]
    pub history_dir: PathBuf,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, env = "BLOGSMITH_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate one blog post and save it as Markdown.
    Generate(GenerateArgs),
    /// Summarise the usage log.
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Main topic of the post.
    #[arg(long)]
    pub topic: String,

    /// Comma-separated keywords.
    #[arg(long)]
    pub keywords: String,

    /// Target length in words (300 to 5000, default 800).
    #[arg(long)]
    pub word_count: Option<u32>,

    /// A key point to cover; repeat for several.
    #[arg(long = "key-point")]
    pub key_points: Vec<String>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name.
    #[arg(long, env = "BLOGSMITH_MODEL", default_value = llm::DEFAULT_MODEL)]
    pub model: String,

    /// Directory the Markdown file is written to.
    #[arg(long, env = "BLOGSMITH_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Wikipedia language edition used for research.
    #[arg(long, env = "BLOGSMITH_WIKI_LANG", default_value = "en")]
    pub wiki_lang: String,

    /// Maximum search rounds the planner may take.
    #[arg(long, env = "BLOGSMITH_MAX_TOOL_ROUNDS", default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    pub max_tool_rounds: usize,

    /// Echo every stage's output while the run progresses.
    #[arg(long, short)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// The submission as the form would have captured it.
    pub fn form(&self) -> BlogForm {
        BlogForm {
            topic: self.topic.clone(),
            keywords: self.keywords.clone(),
            word_count: self.word_count,
            key_points: self.key_points.join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pipeline::WordCount;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_key_points_become_lines() {
        let cli = Cli::try_parse_from([
            "blogsmith",
            "generate",
            "--topic",
            "Solar Power",
            "--keywords",
            "solar, renewable",
            "--key-point",
            "Cost",
            "--key-point",
            "Efficiency",
        ])
        .unwrap();

        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let inputs = args.form().validate().unwrap();
        assert_eq!(inputs.bullet_points, vec!["Cost", "Efficiency"]);
        assert_eq!(inputs.length, WordCount::default());
    }

    #[test]
    fn missing_key_points_fail_validation() {
        let cli = Cli::try_parse_from(["blogsmith", "generate", "--topic", "T", "--keywords", "k"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.form().validate().is_err());
    }
}
