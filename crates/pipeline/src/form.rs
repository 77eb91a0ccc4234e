//! Submission form and the validated input bundle handed to the pipeline.
//!
//! [`BlogForm`] mirrors the interactive surface field by field (free text as
//! typed). [`BlogForm::validate`] is the only way to obtain a [`BlogInputs`],
//! so a pipeline run can never start from an incomplete submission.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::WordCount;

/// Reasons a submission is rejected before any stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty, blank, or normalised to nothing.
    #[error("'{field}' is required")]
    MissingField {
        /// Form label of the offending field.
        field: &'static str,
    },

    /// The word count lies outside the accepted range.
    #[error("word count must be between {min} and {max}, got {value}")]
    WordCountOutOfRange {
        /// The rejected value.
        value: u32,
        /// Lower bound (inclusive).
        min: u32,
        /// Upper bound (inclusive).
        max: u32,
    },
}

/// Raw form fields as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogForm {
    /// Main topic of the post.
    pub topic: String,
    /// Comma-separated keywords.
    pub keywords: String,
    /// Desired length; `None` selects [`WordCount::DEFAULT`].
    pub word_count: Option<u32>,
    /// Newline-separated key points.
    pub key_points: String,
}

impl BlogForm {
    /// Validates and normalises the form into a [`BlogInputs`] bundle.
    ///
    /// Checks run in field order so the first problem reported is the first
    /// one the user sees on the form.
    pub fn validate(&self) -> Result<BlogInputs, ValidationError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::MissingField { field: "Topic" });
        }

        let keywords = split_keywords(&self.keywords);
        if keywords.is_empty() {
            return Err(ValidationError::MissingField { field: "Keywords" });
        }

        let length = match self.word_count {
            None => WordCount::default(),
            Some(value) => WordCount::new(value).ok_or(ValidationError::WordCountOutOfRange {
                value,
                min: WordCount::MIN,
                max: WordCount::MAX,
            })?,
        };

        let bullet_points = split_key_points(&self.key_points);
        if bullet_points.is_empty() {
            return Err(ValidationError::MissingField { field: "Key Points" });
        }

        Ok(BlogInputs {
            topic: topic.to_string(),
            keywords,
            bullet_points,
            length,
        })
    }
}

/// The input bundle consumed by the pipeline runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogInputs {
    /// Main topic, trimmed and non-empty.
    pub topic: String,
    /// Trimmed, non-empty keywords in the order given.
    pub keywords: Vec<String>,
    /// Trimmed, non-empty key points in the order given.
    pub bullet_points: Vec<String>,
    /// Requested article length.
    pub length: WordCount,
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_key_points(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solar_form() -> BlogForm {
        BlogForm {
            topic: "Solar Power".into(),
            keywords: "solar, renewable".into(),
            word_count: Some(800),
            key_points: "Cost\nEfficiency".into(),
        }
    }

    #[test]
    fn valid_form_is_normalised() {
        let inputs = solar_form().validate().unwrap();
        assert_eq!(inputs.topic, "Solar Power");
        assert_eq!(inputs.keywords, vec!["solar", "renewable"]);
        assert_eq!(inputs.bullet_points, vec!["Cost", "Efficiency"]);
        assert_eq!(inputs.length.as_u32(), 800);
    }

    #[test]
    fn empty_key_points_are_rejected() {
        let form = BlogForm {
            key_points: String::new(),
            ..solar_form()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField { field: "Key Points" })
        );
    }

    #[test]
    fn blank_topic_is_rejected_first() {
        let form = BlogForm {
            topic: "   ".into(),
            keywords: String::new(),
            ..solar_form()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField { field: "Topic" })
        );
    }

    #[test]
    fn keywords_of_only_commas_are_rejected() {
        let form = BlogForm {
            keywords: " , ,".into(),
            ..solar_form()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField { field: "Keywords" })
        );
    }

    #[test]
    fn missing_word_count_uses_default() {
        let form = BlogForm {
            word_count: None,
            ..solar_form()
        };
        assert_eq!(form.validate().unwrap().length.as_u32(), WordCount::DEFAULT);
    }

    #[test]
    fn out_of_range_word_count_is_rejected() {
        let form = BlogForm {
            word_count: Some(100),
            ..solar_form()
        };
        assert!(matches!(
            form.validate(),
            Err(ValidationError::WordCountOutOfRange { value: 100, .. })
        ));
    }

    #[test]
    fn blank_lines_between_key_points_are_dropped() {
        let form = BlogForm {
            key_points: "Cost\r\n\n  Efficiency  \n".into(),
            ..solar_form()
        };
        assert_eq!(
            form.validate().unwrap().bullet_points,
            vec!["Cost", "Efficiency"]
        );
    }
}
