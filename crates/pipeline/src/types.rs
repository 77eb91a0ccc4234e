//! Shared value types for the blog generation domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. word counts lie in `300..=5000`,
//! generation times are finite and non-negative).

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// One of the three ordered LLM-driven steps of the content pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Strategy planning; the only stage allowed to call tools.
    Plan,
    /// Drafting the article from the plan.
    Write,
    /// Editing the draft into the deliverable.
    Edit,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Plan, Stage::Write, Stage::Edit];

    /// Stable machine-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Write => "write",
            Stage::Edit => "edit",
        }
    }

    /// Human-readable agent label shown on progress surfaces.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Plan => "Content Planner",
            Stage::Write => "Content Writer",
            Stage::Edit => "Content Editor",
        }
    }

    /// Overall progress (percent) reached once this stage has completed.
    pub fn completed_percent(self) -> u8 {
        match self {
            Stage::Plan => 40,
            Stage::Write => 70,
            Stage::Edit => 100,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Word count
// ---------------------------------------------------------------------------

/// Requested article length in words, in the range `300..=5000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordCount(u32);

impl WordCount {
    /// Smallest accepted length.
    pub const MIN: u32 = 300;
    /// Largest accepted length.
    pub const MAX: u32 = 5000;
    /// Length used when the form leaves the field unset.
    pub const DEFAULT: u32 = 800;

    /// Creates a [`WordCount`], returning `None` outside `MIN..=MAX`.
    #[must_use]
    pub fn new(words: u32) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&words) {
            Some(Self(words))
        } else {
            None
        }
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for WordCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl std::fmt::Display for WordCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Generation time
// ---------------------------------------------------------------------------

/// Wall-clock time a run took, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct GenerationTime(f64);

impl GenerationTime {
    /// Creates a [`GenerationTime`] from seconds.
    ///
    /// Returns `None` if `seconds` is negative, infinite, or NaN.
    #[must_use]
    pub fn from_secs(seconds: f64) -> Option<Self> {
        if seconds.is_finite() && seconds >= 0.0 {
            Some(Self(seconds))
        } else {
            None
        }
    }

    /// Creates a [`GenerationTime`] from an elapsed [`Duration`].
    pub fn from_duration(elapsed: Duration) -> Self {
        Self(elapsed.as_secs_f64())
    }

    /// Returns the duration in seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for GenerationTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} seconds", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Serialises as an RFC 3339 string. Deserialisation also accepts ISO-8601
/// strings without an offset, read as local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 string, or an ISO-8601 date-time without offset
    /// (e.g. `2024-05-01T12:00:00.123456`) interpreted in the local time zone.
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        let utc = Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            // Skipped by a DST transition: no local reading exists.
            .unwrap_or_else(|| naive.and_utc());
        Some(Self(utc))
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Formats the timestamp in the local time zone with a `strftime` pattern.
    pub fn format_local(self, pattern: &str) -> String {
        self.0.with_timezone(&Local).format(pattern).to_string()
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text)
            .ok_or_else(|| de::Error::custom(format!("'{text}' is not an ISO-8601 timestamp")))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_bounds_are_inclusive() {
        assert!(WordCount::new(299).is_none());
        assert_eq!(WordCount::new(300).map(WordCount::as_u32), Some(300));
        assert_eq!(WordCount::new(5000).map(WordCount::as_u32), Some(5000));
        assert!(WordCount::new(5001).is_none());
        assert_eq!(WordCount::default().as_u32(), 800);
    }

    #[test]
    fn generation_time_rejects_negative_and_nan() {
        assert!(GenerationTime::from_secs(-0.1).is_none());
        assert!(GenerationTime::from_secs(f64::NAN).is_none());
        assert_eq!(
            GenerationTime::from_duration(Duration::from_millis(1500)).as_secs_f64(),
            1.5
        );
    }

    #[test]
    fn timestamp_serialises_as_iso_string() {
        let ts = Timestamp::now();
        let json = serde_json::to_value(ts).unwrap();
        let text = json.as_str().expect("timestamp should serialise to a string");
        assert!(text.contains('T'));
        let back: Timestamp = serde_json::from_value(json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn timestamps_without_offset_are_read_as_local_time() {
        let ts: Timestamp = serde_json::from_value(serde_json::json!("2024-05-01T12:00:00.123456")).unwrap();
        assert_eq!(ts.format_local("%Y-%m-%d %H:%M:%S%.6f"), "2024-05-01 12:00:00.123456");

        let whole = Timestamp::parse("2024-05-01T12:00:00").unwrap();
        assert_eq!(whole.format_local("%H:%M:%S"), "12:00:00");
    }

    #[test]
    fn offset_timestamps_are_normalised_to_utc() {
        let ts = Timestamp::parse("2024-05-01T14:00:00+02:00").unwrap();
        assert_eq!(ts.to_string(), "2024-05-01T12:00:00+00:00");
        assert!(Timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn stages_progress_in_order() {
        let percents: Vec<u8> = Stage::ALL.iter().map(|s| s.completed_percent()).collect();
        assert_eq!(percents, vec![40, 70, 100]);
    }
}
