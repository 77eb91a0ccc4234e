//! Validated runtime configuration.
//!
//! Command-line flags and environment variables are folded into an
//! [`AppConfig`] before any infrastructure is constructed. A missing API key
//! is fatal.

use std::path::PathBuf;

use pipeline::{BlogGenError, ModelName};

use crate::cli::GenerateArgs;

/// Everything `generate` needs to build the pipeline.
#[derive(Clone)]
pub struct AppConfig {
    /// Gemini API key; never blank.
    pub api_key: String,
    /// Gemini model to call.
    pub model: ModelName,
    /// Directory holding the JSON history files.
    pub history_dir: PathBuf,
    /// Directory the Markdown post is written to.
    pub output_dir: PathBuf,
    /// Lower-cased Wikipedia language code, e.g. `en`.
    pub wiki_lang: String,
    /// Tool rounds allowed per stage; at least 1.
    pub max_tool_rounds: usize,
}

impl AppConfig {
    /// Validates `args`, failing with [`BlogGenError::Configuration`].
    pub fn from_args(args: &GenerateArgs, history_dir: PathBuf) -> Result<Self, BlogGenError> {
        let api_key = args
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BlogGenError::configuration("GEMINI_API_KEY is not set"))?
            .to_string();

        let model = ModelName::new(args.model.trim())
            .ok_or_else(|| BlogGenError::configuration("model name must not be empty"))?;

        let wiki_lang = args.wiki_lang.trim().to_ascii_lowercase();
        if wiki_lang.is_empty() || !wiki_lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(BlogGenError::configuration(format!(
                "'{}' is not a Wikipedia language code",
                args.wiki_lang
            )));
        }

        if args.max_tool_rounds == 0 {
            return Err(BlogGenError::configuration(
                "max tool rounds must be at least 1",
            ));
        }

        Ok(Self {
            api_key,
            model,
            history_dir,
            output_dir: args.output_dir.clone(),
            wiki_lang,
            max_tool_rounds: args.max_tool_rounds,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("history_dir", &self.history_dir)
            .field("output_dir", &self.output_dir)
            .field("wiki_lang", &self.wiki_lang)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish()
    }
}
