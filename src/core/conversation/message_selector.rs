// =============================================================================
// SMART MESSAGE SELECTION
// =============================================================================
//
// Reduces a long conversation to a bounded, chronological subset. Instead of
// blindly taking the last N messages, it:
// 1. Always keeps the most recent messages verbatim
// 2. Scores older messages by relevance (see `relevance.rs`)
// 3. Keeps the highest-scoring ones up to the target count
// 4. Returns older picks in chronological order, then the recent messages

use super::conversation_models::{MessageRecord, QualityReport, ScoredMessage};
use super::relevance::RelevanceScorer;
use super::text_analysis::{is_question, MIN_KEYWORD_CHARS};
use std::collections::HashSet;

/// Conversations at or below this length are returned untouched.
pub const SELECTION_THRESHOLD: usize = 50;
/// Most recent messages that are never scored or dropped.
pub const IMMEDIATE_CONTEXT: usize = 5;
/// Default size of the selected context.
pub const DEFAULT_TARGET_COUNT: usize = 30;
/// Unanswered questions tolerated before the context is flagged.
const MAX_UNANSWERED_QUESTIONS: usize = 2;
/// A gap this many times the average gap is flagged.
const GAP_RATIO_LIMIT: i64 = 10;

/// Builds topic keywords from a free-text hint.
///
/// Keeps whitespace tokens longer than 3 chars (lower-cased) and adds a naive
/// plural/singular variant after each one.
pub fn topic_keywords(topic_hint: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    for token in topic_hint.split_whitespace() {
        if token.chars().count() <= MIN_KEYWORD_CHARS {
            continue;
        }
        let word = token.to_lowercase();
        let variant = match word.strip_suffix('s') {
            Some(singular) => singular.to_string(),
            None => format!("{}s", word),
        };
        keywords.push(word);
        keywords.push(variant);
    }
    keywords
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SmartMessageSelector {
    scorer: RelevanceScorer,
}

impl SmartMessageSelector {
    pub fn new(scorer: RelevanceScorer) -> Self {
        Self { scorer }
    }

    /// Selects at most `target_count` messages from a long conversation.
    ///
    /// Sequences of 50 messages or fewer come back unchanged. Otherwise the
    /// last 5 messages are kept as-is and the best-scoring older messages fill
    /// the remaining slots. A `target_count` below 5 shrinks the reserved tail
    /// so the result still fits.
    pub fn select(
        &self,
        sequence: &[MessageRecord],
        topic_hint: Option<&str>,
        target_count: usize,
    ) -> Vec<MessageRecord> {
        if sequence.len() <= SELECTION_THRESHOLD {
            return sequence.to_vec();
        }

        let reserved = IMMEDIATE_CONTEXT.min(target_count);
        let split_point = sequence.len() - reserved;
        let (candidates, immediate) = sequence.split_at(split_point);

        let keywords = topic_keywords(topic_hint.unwrap_or(""));

        // Indices stay relative to the full sequence so recency is chronological
        let mut scored: Vec<ScoredMessage> = candidates
            .iter()
            .enumerate()
            .map(|(index, message)| ScoredMessage {
                index,
                score: self.scorer.score(message, index, sequence, &keywords),
                message,
            })
            .collect();

        // Stable sort: equal scores keep their original order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(target_count - reserved);

        // Back to chronological order; unset timestamps sort first
        scored.sort_by_key(|s| (s.message.timestamp_millis(), s.index));

        tracing::debug!(
            total = sequence.len(),
            selected = scored.len(),
            reserved,
            keywords = keywords.len(),
            "Selected relevant messages"
        );

        scored
            .into_iter()
            .map(|s| s.message.clone())
            .chain(immediate.iter().cloned())
            .collect()
    }

    /// Checks a selected context for signs it will read poorly downstream.
    pub fn validate_quality(&self, messages: &[MessageRecord]) -> QualityReport {
        let mut issues = Vec::new();

        let speakers: HashSet<&str> = messages.iter().map(|m| m.speaker_key()).collect();
        if speakers.len() < 2 {
            issues.push("Fewer than 2 distinct speakers in context".to_string());
        }

        if let Some(last) = messages.last() {
            if is_question(&last.text) {
                issues.push("Context ends with an unanswered question".to_string());
            }
        }

        let unanswered = count_unanswered_questions(messages);
        if unanswered > MAX_UNANSWERED_QUESTIONS {
            issues.push(format!("{} questions appear unanswered", unanswered));
        }

        if let Some((max_gap, avg_gap)) = time_gaps(messages) {
            if avg_gap > 0 && max_gap > avg_gap * GAP_RATIO_LIMIT {
                issues.push(format!(
                    "Large time gap in context ({}s vs {}s average)",
                    max_gap / 1000,
                    avg_gap / 1000
                ));
            }
        }

        let report = QualityReport::from_issues(issues);
        if !report.valid {
            tracing::debug!(quality = %report.quality, issues = ?report.issues, "Context quality issues");
        }
        report
    }
}

/// Questions not followed by a message from someone else.
fn count_unanswered_questions(messages: &[MessageRecord]) -> usize {
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| is_question(&m.text))
        .filter(|(i, m)| match messages.get(i + 1) {
            Some(next) => next.speaker_key() == m.speaker_key(),
            None => true,
        })
        .count()
}

/// (max, average) gap in milliseconds between consecutive timestamped messages.
fn time_gaps(messages: &[MessageRecord]) -> Option<(i64, i64)> {
    let stamps: Vec<i64> = messages
        .iter()
        .filter_map(|m| m.timestamp.map(|t| t.timestamp_millis()))
        .collect();
    if stamps.len() < 2 {
        return None;
    }

    let gaps: Vec<i64> = stamps.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let max = gaps.iter().copied().max()?;
    let avg = gaps.iter().sum::<i64>() / gaps.len() as i64;
    Some((max, avg))
}

// =============================================================================
// TESTS
// =============================================================================
