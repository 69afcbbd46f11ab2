// Conversation summarization.
//
// Once a conversation outgrows the recent window, everything before the window
// is condensed into one descriptive sentence. Recent messages are kept
// verbatim so the newest context always reads exactly as written.

use super::conversation_models::{MessageRecord, SummaryResult};
use super::text_analysis::{excerpt, is_question, keyword_tokens};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Messages kept verbatim; longer conversations get a summary.
pub const RECENT_WINDOW: usize = 28;
/// Hard cap on the summary sentence, in characters.
pub const SUMMARY_CHAR_BUDGET: usize = 200;
const QUESTION_EXCERPT_CHARS: usize = 80;
const MAX_LISTED_SPEAKERS: usize = 3;
const TOP_KEYWORDS: usize = 5;
const LISTED_KEYWORDS: usize = 3;
const MAX_MOMENTS: usize = 3;
/// More emotional messages than this earn a mention.
const EMOTIONAL_MESSAGE_THRESHOLD: usize = 2;
const ELLIPSIS: &str = "...";

pub const SUMMARY_HEADER: &str = "📋 CONVERSATION SUMMARY:";
pub const RECENT_HEADER: &str = "📝 RECENT MESSAGES:";

/// Stop words for summary keywords. Kept separate from the topic detector list.
pub const SUMMARY_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "can", "this", "that", "these", "those", "i", "you",
    "he", "she", "it", "we", "they", "me", "my", "your", "what", "when", "where", "why", "how",
    "just", "like", "about", "there", "then", "than", "them", "also", "very", "really", "some",
    "want", "going", "know", "think", "okay", "yeah", "haha", "ami", "tumi", "ache", "hobe",
    "kintu", "korbo", "accha",
];

static EMOTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(love|hate|happy|sad|angry|upset|sorry|miss|excited|worried|scared|amazing|awesome|terrible|awful|thank|thanks|lol|omg|wow|ugh|bhalobashi|kosto|mon kharap)\b|[😀😂🤣😍🥰😘😊😢😭😡❤💔]",
    )
    .expect("emotion regex is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationSummarizer;

impl ConversationSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Splits off the recent window and summarizes what came before it.
    pub fn summarize(&self, messages: &[MessageRecord]) -> SummaryResult {
        let total = messages.len();
        if total <= RECENT_WINDOW {
            return SummaryResult {
                has_summary: false,
                recent_messages: messages.to_vec(),
                older_summary: None,
                total_messages: total,
                summarized_count: 0,
                recent_count: total,
            };
        }

        let (older, recent) = messages.split_at(total - RECENT_WINDOW);
        let summary = build_summary(older);

        tracing::debug!(
            total,
            summarized = older.len(),
            summary_chars = summary.chars().count(),
            "Summarized older messages"
        );

        SummaryResult {
            has_summary: true,
            recent_messages: recent.to_vec(),
            older_summary: Some(summary),
            total_messages: total,
            summarized_count: older.len(),
            recent_count: recent.len(),
        }
    }

    /// Context lines for prompt construction.
    ///
    /// Without a summary every message is rendered as `"{Speaker}: {text}"`.
    /// With one, the summary and a recent-messages header come first.
    pub fn summarized_context(&self, messages: &[MessageRecord]) -> Vec<String> {
        let result = self.summarize(messages);
        let rendered = result.recent_messages.iter().map(MessageRecord::render);

        match result.older_summary {
            Some(summary) if result.has_summary => {
                let mut lines = vec![
                    format!("{} {}", SUMMARY_HEADER, summary),
                    String::new(),
                    RECENT_HEADER.to_string(),
                ];
                lines.extend(rendered);
                lines
            }
            _ => rendered.collect(),
        }
    }
}

/// Concatenates every component, then truncates once.
fn build_summary(older: &[MessageRecord]) -> String {
    let mut summary = format!(
        "Earlier: {} messages over {}",
        older.len(),
        describe_timespan(older)
    );

    let speakers = distinct_speakers(older);
    if !speakers.is_empty() {
        let listed: Vec<&str> = speakers.iter().take(MAX_LISTED_SPEAKERS).copied().collect();
        summary.push_str(&format!(" between {}", listed.join(", ")));
    }

    summary.push_str(&format!(" ({})", conversation_pattern(older)));

    let keywords = top_keywords(older, TOP_KEYWORDS);
    if !keywords.is_empty() {
        let listed: Vec<&str> = keywords
            .iter()
            .take(LISTED_KEYWORDS)
            .map(String::as_str)
            .collect();
        summary.push_str(&format!(". Discussed: {}", listed.join(", ")));
    }

    for moment in important_moments(older) {
        summary.push_str(&moment);
    }

    truncate_at_word(&summary, SUMMARY_CHAR_BUDGET)
}

/// Coarsest non-zero unit between the first and last timestamped messages.
fn describe_timespan(messages: &[MessageRecord]) -> String {
    let mut stamps = messages.iter().filter_map(|m| m.timestamp);
    let (first, last) = match (stamps.next(), stamps.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return "recent".to_string(),
    };

    let span = if last >= first { last - first } else { first - last };
    let (days, hours, minutes) = (span.num_days(), span.num_hours(), span.num_minutes());
    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        "recent".to_string()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Display names in order of first appearance, empty names skipped.
fn distinct_speakers(messages: &[MessageRecord]) -> Vec<&str> {
    let mut speakers: Vec<&str> = Vec::new();
    for message in messages {
        let key = message.speaker_key();
        if key.trim().is_empty() || speakers.contains(&key) {
            continue;
        }
        speakers.push(key);
    }
    speakers
}

fn conversation_pattern(messages: &[MessageRecord]) -> &'static str {
    if messages.len() < 2 {
        return "brief";
    }

    let distinct: std::collections::HashSet<&str> =
        messages.iter().map(|m| m.speaker_key()).collect();
    if distinct.len() == 1 {
        return "monologue";
    }

    let changes = messages
        .windows(2)
        .filter(|pair| pair[0].speaker_key() != pair[1].speaker_key())
        .count();
    let change_rate = changes as f64 / (messages.len() - 1) as f64;

    if change_rate > 0.7 {
        "active dialogue"
    } else if change_rate > 0.3 {
        "mixed exchange"
    } else {
        "sequential messages"
    }
}

/// Most frequent keywords, ties broken by first appearance.
fn top_keywords(messages: &[MessageRecord], limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;
    for message in messages {
        for token in keyword_tokens(&message.text, SUMMARY_STOP_WORDS) {
            let entry = counts.entry(token).or_insert((0, order));
            entry.0 += 1;
            order += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().take(limit).map(|(word, _, _)| word).collect()
}

/// Notable moments, in priority order: last question, shared media, emotion.
fn important_moments(messages: &[MessageRecord]) -> Vec<String> {
    let mut moments = Vec::new();

    if let Some(question) = messages.iter().rev().find(|m| is_question(&m.text)) {
        moments.push(format!(
            ". {} asked: \"{}\"",
            question.display_speaker(),
            excerpt(&question.text, QUESTION_EXCERPT_CHARS)
        ));
    }

    let (media_count, media_types) = shared_media(messages);
    if media_count > 0 {
        let types = if media_types.is_empty() {
            "files".to_string()
        } else {
            media_types.join(", ")
        };
        moments.push(format!(". Shared {} {}", media_count, types));
    }

    let emotional = messages
        .iter()
        .filter(|m| EMOTION_RE.is_match(&m.text))
        .count();
    if emotional > EMOTIONAL_MESSAGE_THRESHOLD {
        moments.push(format!(". {} emotional exchanges", emotional));
    }

    moments.truncate(MAX_MOMENTS);
    moments
}

/// Counts attachment entries under `attachments` / `media` metadata keys.
fn shared_media(messages: &[MessageRecord]) -> (usize, Vec<String>) {
    let mut count = 0;
    let mut types: Vec<String> = Vec::new();

    for message in messages {
        for key in ["attachments", "media"] {
            let Some(items) = message.metadata.get(key).and_then(|v| v.as_array()) else {
                continue;
            };
            for item in items {
                count += 1;
                let kind = item
                    .as_str()
                    .or_else(|| item.get("type").and_then(|t| t.as_str()));
                if let Some(kind) = kind {
                    if !kind.is_empty() && !types.iter().any(|t| t == kind) {
                        types.push(kind.to_string());
                    }
                }
            }
        }
    }

    (count, types)
}

/// Caps `text` at `budget` chars, cutting at whitespace and adding `...`.
pub fn truncate_at_word(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let keep = budget.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(keep).collect();

    // Cutting right before whitespace never splits a word
    let next_is_space = text.chars().nth(keep).is_some_and(char::is_whitespace);
    let cut = if next_is_space {
        head.as_str()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(pos) => &head[..pos],
            None => "",
        }
    };

    format!("{}{}", cut.trim_end(), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn dialogue(count: usize) -> Vec<MessageRecord> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let speaker = if i % 2 == 0 { "You" } else { "Ana" };
                MessageRecord::new(speaker, format!("hey {}", i))
                    .with_timestamp(start + Duration::minutes(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_below_threshold_passthrough() {
        let msgs = dialogue(28);
        let result = ConversationSummarizer::new().summarize(&msgs);
        assert!(!result.has_summary);
        assert!(result.older_summary.is_none());
        assert_eq!(result.recent_messages, msgs);
        assert_eq!(result.summarized_count, 0);
        assert_eq!(result.recent_count, 28);
    }

    #[test]
    fn test_one_over_threshold() {
        let msgs = dialogue(29);
        let result = ConversationSummarizer::new().summarize(&msgs);
        assert!(result.has_summary);
        assert_eq!(result.summarized_count, 1);
        assert_eq!(result.recent_count, 28);
        assert_eq!(result.total_messages, 29);
        assert_eq!(&result.recent_messages[..], &msgs[1..]);
        assert_eq!(
            result.older_summary.as_deref(),
            Some("Earlier: 1 messages over recent between You (brief)")
        );
    }

    #[test]
    fn test_summary_components_in_order() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let older = vec![
            MessageRecord::new("Ana", "Planning the garden party")
                .with_timestamp(start),
            MessageRecord::new("You", "Garden party needs chairs")
                .with_timestamp(start + Duration::hours(1)),
            MessageRecord::new("Ana", "Can you bring chairs")
                .with_timestamp(start + Duration::hours(3)),
        ];
        let summary = build_summary(&older);
        assert_eq!(
            summary,
            "Earlier: 3 messages over 3 hours between Ana, You (active dialogue). \
             Discussed: garden, party, chairs. Ana asked: \"Can you bring chairs\""
        );
    }

    #[test]
    fn test_timespan_units() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let at = |d: Duration| MessageRecord::new("Ana", "x").with_timestamp(start + d);

        assert_eq!(describe_timespan(&[at(Duration::zero()), at(Duration::days(2))]), "2 days");
        assert_eq!(describe_timespan(&[at(Duration::zero()), at(Duration::hours(1))]), "1 hour");
        assert_eq!(
            describe_timespan(&[at(Duration::zero()), at(Duration::minutes(5))]),
            "5 minutes"
        );
        assert_eq!(
            describe_timespan(&[at(Duration::zero()), at(Duration::seconds(30))]),
            "recent"
        );
        assert_eq!(describe_timespan(&[at(Duration::zero())]), "recent");
        assert_eq!(describe_timespan(&[MessageRecord::new("Ana", "x")]), "recent");
    }

    #[test]
    fn test_patterns() {
        let seq = |speakers: &[&str]| -> Vec<MessageRecord> {
            speakers.iter().map(|s| MessageRecord::new(*s, "x")).collect()
        };
        assert_eq!(conversation_pattern(&seq(&["Ana"])), "brief");
        assert_eq!(conversation_pattern(&seq(&["Ana", "Ana", "Ana"])), "monologue");
        assert_eq!(conversation_pattern(&seq(&["Ana", "You", "Ana"])), "active dialogue");
        assert_eq!(
            conversation_pattern(&seq(&["Ana", "Ana", "You", "You"])),
            "mixed exchange"
        );
        assert_eq!(
            conversation_pattern(&seq(&["Ana", "Ana", "Ana", "Ana", "You", "You", "You"])),
            "sequential messages"
        );
    }

    #[test]
    fn test_top_keywords_frequency_then_order() {
        let msgs = vec![
            MessageRecord::new("Ana", "beach beach sunset"),
            MessageRecord::new("You", "sunset dinner beach"),
            MessageRecord::new("Ana", "dinner"),
        ];
        assert_eq!(top_keywords(&msgs, 5), vec!["beach", "sunset", "dinner"]);
        assert_eq!(top_keywords(&msgs, 1), vec!["beach"]);
    }

    #[test]
    fn test_media_and_emotion_moments() {
        let msgs = vec![
            MessageRecord::new("Ana", "I love this")
                .with_metadata("attachments", json!(["image", { "type": "video" }, "image"])),
            MessageRecord::new("You", "so happy"),
            MessageRecord::new("Ana", "thanks a lot"),
        ];
        let moments = important_moments(&msgs);
        assert_eq!(
            moments,
            vec![
                ". Shared 3 image, video".to_string(),
                ". 3 emotional exchanges".to_string()
            ]
        );
    }

    #[test]
    fn test_media_without_types() {
        let msgs = vec![MessageRecord::new("Ana", "see").with_metadata("media", json!([{}]))];
        assert_eq!(shared_media(&msgs), (1, Vec::<String>::new()));
        assert_eq!(important_moments(&msgs), vec![". Shared 1 files".to_string()]);
    }

    #[test]
    fn test_question_excerpt_truncated() {
        let long_question = format!("Why {}?", "very ".repeat(30));
        let msgs = vec![MessageRecord::new("Ana", long_question.as_str())];
        let moments = important_moments(&msgs);
        assert_eq!(moments.len(), 1);
        assert!(moments[0].starts_with(". Ana asked: \"Why very"));
        assert!(moments[0].ends_with("...\""));
    }

    #[test]
    fn test_truncate_at_word() {
        assert_eq!(truncate_at_word("short text", 200), "short text");
        assert_eq!(truncate_at_word("alpha beta gamma", 12), "alpha...");
        assert_eq!(truncate_at_word("alpha beta gamma", 13), "alpha beta...");
        assert_eq!(truncate_at_word("unbroken", 5), "...");
    }

    #[test]
    fn test_long_summary_respects_budget() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut msgs: Vec<MessageRecord> = (0..40)
            .map(|i| {
                let speaker = ["Ana", "Rafi", "Mitu", "Jamal"][i % 4];
                MessageRecord::new(
                    speaker,
                    format!("Wonderful extraordinary conversation number {} love", i),
                )
                .with_timestamp(start + Duration::hours(i as i64))
            })
            .collect();
        msgs[5].text = format!("Could you possibly {} explain?", "really ".repeat(20));
        msgs[6] = msgs[6]
            .clone()
            .with_metadata("attachments", json!(["image"]));

        let summary = ConversationSummarizer::new()
            .summarize(&msgs)
            .older_summary
            .unwrap();
        assert!(summary.chars().count() <= SUMMARY_CHAR_BUDGET);
        assert!(summary.ends_with("..."));
        let body = summary.trim_end_matches("...");
        assert!(!body.ends_with(char::is_whitespace));
        assert!(summary.starts_with("Earlier: 12 messages over 11 hours between Ana, Rafi, Mitu"));
    }

    #[test]
    fn test_summarized_context_lines() {
        let short = dialogue(3);
        assert_eq!(
            ConversationSummarizer::new().summarized_context(&short),
            vec!["You: hey 0", "Ana: hey 1", "You: hey 2"]
        );

        let long = dialogue(30);
        let lines = ConversationSummarizer::new().summarized_context(&long);
        assert_eq!(lines.len(), 3 + 28);
        assert!(lines[0].starts_with("📋 CONVERSATION SUMMARY: Earlier: 2 messages"));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "📝 RECENT MESSAGES:");
        assert_eq!(lines[3], "You: hey 2");
    }

    #[test]
    fn test_empty_input() {
        let result = ConversationSummarizer::new().summarize(&[]);
        assert!(!result.has_summary);
        assert!(ConversationSummarizer::new().summarized_context(&[]).is_empty());
    }
}
