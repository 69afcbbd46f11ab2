// =============================================================================
// RELEVANCE SCORING
// =============================================================================
//
// Scores one message of a conversation for context selection. The score is a
// plain sum of independent signals:
// 1. Recency (position in the sequence)
// 2. Topic keyword coverage
// 3. Question / answer bonuses
// 4. Speaker alternation
// 5. Message length
//
// Scores are not normalized and only comparable within one pass.

use super::conversation_models::MessageRecord;
use super::text_analysis::is_question;

/// Maximum contribution of the recency term.
pub const RECENCY_WEIGHT: f64 = 30.0;
/// Maximum contribution of topic keyword coverage.
pub const TOPIC_WEIGHT: f64 = 25.0;
/// Flat bonus for a message that is itself a question.
pub const QUESTION_BONUS: f64 = 20.0;
/// Flat bonus for a message that follows a question.
pub const ANSWER_BONUS: f64 = 15.0;
/// Bonus when the speaker differs from the previous message.
pub const ALTERNATION_BONUS: f64 = 10.0;
/// Bonus when the speaker repeats (never zero).
pub const REPEAT_SPEAKER_BONUS: f64 = 3.0;
/// Characters per length-bonus point.
pub const LENGTH_DIVISOR: f64 = 50.0;
/// Length bonus cap (reached at 500 chars).
pub const LENGTH_BONUS_CAP: f64 = 10.0;

/// Individual terms of a relevance score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub recency: f64,
    pub topic: f64,
    pub question: f64,
    pub answer: f64,
    pub alternation: f64,
    pub length: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.recency + self.topic + self.question + self.answer + self.alternation + self.length
    }
}

/// Pure scorer: the result depends only on its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer;

impl RelevanceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Total relevance of `message`, found at `index` within `sequence`.
    ///
    /// `topic_keywords` are expected lower-cased; an empty list contributes 0.
    pub fn score(
        &self,
        message: &MessageRecord,
        index: usize,
        sequence: &[MessageRecord],
        topic_keywords: &[String],
    ) -> f64 {
        self.score_breakdown(message, index, sequence, topic_keywords)
            .total()
    }

    /// Same as [`score`](Self::score) but keeps each term separate.
    pub fn score_breakdown(
        &self,
        message: &MessageRecord,
        index: usize,
        sequence: &[MessageRecord],
        topic_keywords: &[String],
    ) -> ScoreBreakdown {
        let previous = index.checked_sub(1).and_then(|i| sequence.get(i));

        ScoreBreakdown {
            recency: recency_score(index, sequence.len()),
            topic: topic_score(&message.text, topic_keywords),
            question: if is_question(&message.text) {
                QUESTION_BONUS
            } else {
                0.0
            },
            answer: match previous {
                Some(prev) if is_question(&prev.text) => ANSWER_BONUS,
                _ => 0.0,
            },
            alternation: match previous {
                Some(prev) if prev.speaker_key() != message.speaker_key() => ALTERNATION_BONUS,
                _ => REPEAT_SPEAKER_BONUS,
            },
            length: length_score(&message.text),
        }
    }
}

fn recency_score(index: usize, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    (index as f64 / len as f64) * RECENCY_WEIGHT
}

fn topic_score(text: &str, topic_keywords: &[String]) -> f64 {
    if topic_keywords.is_empty() {
        return 0.0;
    }

    let text_lower = text.to_lowercase();
    let matches = topic_keywords
        .iter()
        .filter(|keyword| text_lower.contains(keyword.to_lowercase().as_str()))
        .count();

    (matches as f64 / topic_keywords.len() as f64) * TOPIC_WEIGHT
}

fn length_score(text: &str) -> f64 {
    (text.chars().count() as f64 / LENGTH_DIVISOR).min(LENGTH_BONUS_CAP)
}

// =============================================================================
// TESTS
// =============================================================================
