// Conversation domain models - data structures for the context pipeline.
//
// These are pure domain types with no browser or network dependencies.
// The scraping layer produces MessageRecords; everything downstream only
// reads them and derives new values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Speaker name reserved for the local user.
pub const LOCAL_SPEAKER: &str = "You";

/// One normalized chat message as scraped from the page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Message body (may be empty)
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// "You" for the local user, anything else is an interlocutor
    #[serde(default, deserialize_with = "null_as_default")]
    pub speaker: String,
    /// Whether the local user authored the message
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_outgoing: bool,
    /// Arrival time, if the page exposed one
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    /// Open metadata, e.g. an `attachments` list
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl MessageRecord {
    /// Creates a message with no timestamp or metadata.
    ///
    /// `is_outgoing` is derived from the speaker name.
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        let speaker = speaker.into();
        Self {
            is_outgoing: speaker == LOCAL_SPEAKER,
            speaker,
            text: text.into(),
            timestamp: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// True when either the outgoing flag or the speaker name marks the local user.
    pub fn is_from_user(&self) -> bool {
        self.is_outgoing || self.speaker == LOCAL_SPEAKER
    }

    /// Speaker identity used for comparisons (alternation, distinct speakers).
    pub fn speaker_key(&self) -> &str {
        if self.is_from_user() {
            LOCAL_SPEAKER
        } else {
            &self.speaker
        }
    }

    /// Name shown in rendered context lines.
    pub fn display_speaker(&self) -> &str {
        let key = self.speaker_key();
        if key.trim().is_empty() {
            "Unknown"
        } else {
            key
        }
    }

    /// Epoch milliseconds, 0 when unset.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.map(|t| t.timestamp_millis()).unwrap_or(0)
    }

    /// Renders the message as `"{Speaker}: {text}"`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.display_speaker(), self.text)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 strings or epoch milliseconds. Anything else becomes `None`
/// so one bad timestamp never rejects the message.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    })
}

/// A message paired with its relevance score for one selection pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMessage<'a> {
    /// Position in the full input sequence
    pub index: usize,
    pub score: f64,
    pub message: &'a MessageRecord,
}

/// A likely topic boundary found by the sliding-window detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePoint {
    /// Index of the first message after the boundary
    pub index: usize,
    /// Jaccard similarity of the two windows
    pub similarity: f64,
    /// `1 - similarity`
    pub confidence: f64,
    /// Up to 3 sample keywords from the window before the boundary
    pub before_keywords: Vec<String>,
    /// Up to 3 sample keywords from the window after the boundary
    pub after_keywords: Vec<String>,
}

/// Outcome of condensing older history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub has_summary: bool,
    pub recent_messages: Vec<MessageRecord>,
    pub older_summary: Option<String>,
    pub total_messages: usize,
    pub summarized_count: usize,
    pub recent_count: usize,
}

/// Overall verdict of a quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextQuality {
    Excellent,
    Good,
    Poor,
}

impl ContextQuality {
    pub fn from_issue_count(count: usize) -> Self {
        match count {
            0 => ContextQuality::Excellent,
            1 | 2 => ContextQuality::Good,
            _ => ContextQuality::Poor,
        }
    }
}

impl std::fmt::Display for ContextQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextQuality::Excellent => write!(f, "excellent"),
            ContextQuality::Good => write!(f, "good"),
            ContextQuality::Poor => write!(f, "poor"),
        }
    }
}

/// Diagnostics for a selected context. Never blocks the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub quality: ContextQuality,
}

impl QualityReport {
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            valid: issues.is_empty(),
            quality: ContextQuality::from_issue_count(issues.len()),
            issues,
        }
    }
}

/// Tunable inputs for one assembly run.
///
/// Scoring weights and thresholds are fixed constants, not configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextConfig {
    /// Maximum number of messages kept by the selector
    pub target_count: usize,
    /// Half-width of the topic change window
    pub topic_window: usize,
    /// Free-text topic used for relevance scoring
    pub topic_hint: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            target_count: 30, // same as the selector default
            topic_window: 5,
            topic_hint: None,
        }
    }
}

impl ContextConfig {
    /// Reads `CONTEXT_TARGET_COUNT`, `CONTEXT_TOPIC_WINDOW` and `CONTEXT_TOPIC_HINT`.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ContextConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let number = |key: &str, default: usize| match lookup(key) {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
                default
            }),
            None => default,
        };

        Self {
            target_count: number("CONTEXT_TARGET_COUNT", defaults.target_count),
            topic_window: number("CONTEXT_TOPIC_WINDOW", defaults.topic_window),
            topic_hint: lookup("CONTEXT_TOPIC_HINT").filter(|hint| !hint.trim().is_empty()),
        }
    }
}
