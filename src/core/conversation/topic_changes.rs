// Topic change detection.
//
// Slides a symmetric window over the conversation and compares the keyword
// vocabulary on each side of every candidate index. Low Jaccard similarity
// marks a likely topic boundary.

use super::conversation_models::{ChangePoint, MessageRecord};
use super::text_analysis::{keyword_tokens, OrderedKeywords};
use std::collections::HashSet;

/// Default half-width of the comparison window.
pub const DEFAULT_WINDOW_SIZE: usize = 5;
/// Similarity below this marks a change point.
pub const CHANGE_THRESHOLD: f64 = 0.3;
/// Sample keywords reported per side.
const SAMPLE_KEYWORDS: usize = 3;

/// Stop words for window vocabularies. Kept separate from the summarizer list.
pub const TOPIC_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "this", "that", "these", "those", "i",
    "you", "he", "she", "it", "we", "they", "what", "which", "who", "when", "where", "why",
    "how", "just", "like", "about", "there", "their", "then", "than", "them", "your", "yours",
    "okay", "yeah", "haha", "ami", "tumi", "ache", "hobe", "kintu", "kore", "korbo", "valo",
    "accha", "achi",
];

#[derive(Debug, Clone, Copy)]
pub struct TopicChangeDetector {
    window_size: usize,
}

impl Default for TopicChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl TopicChangeDetector {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Finds likely topic boundaries, in ascending index order.
    ///
    /// Returns an empty list when the sequence is shorter than two windows.
    /// Adjacent low-similarity indices each produce their own entry.
    pub fn detect_changes(&self, sequence: &[MessageRecord]) -> Vec<ChangePoint> {
        let w = self.window_size;
        if w == 0 || sequence.len() < 2 * w {
            return Vec::new();
        }

        let mut changes = Vec::new();
        for i in w..(sequence.len() - w) {
            let before = window_keywords(&sequence[i - w..i]);
            let after = window_keywords(&sequence[i..i + w]);
            let similarity = jaccard_similarity(before.set(), after.set());

            if similarity < CHANGE_THRESHOLD {
                tracing::trace!(index = i, similarity, "Topic change candidate");
                changes.push(ChangePoint {
                    index: i,
                    similarity,
                    confidence: 1.0 - similarity,
                    before_keywords: before.sample(SAMPLE_KEYWORDS),
                    after_keywords: after.sample(SAMPLE_KEYWORDS),
                });
            }
        }

        changes
    }
}

fn window_keywords(window: &[MessageRecord]) -> OrderedKeywords {
    let mut keywords = OrderedKeywords::new();
    for message in window {
        keywords.extend(keyword_tokens(&message.text, TOPIC_STOP_WORDS));
    }
    keywords
}

/// `|a ∩ b| / |a ∪ b|`, or 0 when either side is empty.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(texts: &[&str]) -> Vec<MessageRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| MessageRecord::new(if i % 2 == 0 { "You" } else { "Ana" }, *text))
            .collect()
    }

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard_similarity(&set(&["a", "b"]), &set(&["b", "c"])), 1.0 / 3.0);
        assert_eq!(jaccard_similarity(&set(&["a"]), &set(&[])), 0.0);
        assert_eq!(jaccard_similarity(&set(&["a"]), &set(&["a"])), 1.0);
    }

    #[test]
    fn test_too_short_returns_empty() {
        let seq = messages(&["one", "two", "three"]);
        assert!(TopicChangeDetector::new(2).detect_changes(&seq).is_empty());
        assert!(TopicChangeDetector::default().detect_changes(&[]).is_empty());
    }

    #[test]
    fn test_exactly_two_windows_has_no_candidates() {
        let seq = messages(&[
            "football match tonight",
            "football stadium tickets",
            "recipe pasta sauce",
            "recipe garlic bread",
        ]);
        assert!(TopicChangeDetector::new(2).detect_changes(&seq).is_empty());
    }

    #[test]
    fn test_zero_window_returns_empty() {
        let seq = messages(&["football match tonight", "football match tonight"]);
        assert!(TopicChangeDetector::new(0).detect_changes(&seq).is_empty());
    }

    #[test]
    fn test_disjoint_windows_full_confidence() {
        let seq = messages(&[
            "football match tonight",
            "football stadium tickets",
            "recipe pasta sauce",
            "recipe garlic bread",
            "recipe oven timer",
        ]);
        let changes = TopicChangeDetector::new(2).detect_changes(&seq);
        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.index, 2);
        assert_eq!(change.similarity, 0.0);
        assert_eq!(change.confidence, 1.0);
        assert_eq!(
            change.before_keywords,
            vec!["football".to_string(), "match".to_string(), "tonight".to_string()]
        );
        assert_eq!(
            change.after_keywords,
            vec!["recipe".to_string(), "pasta".to_string(), "sauce".to_string()]
        );
    }

    #[test]
    fn test_stable_topic_has_no_changes() {
        let seq = messages(&[
            "football match tonight",
            "football match tickets",
            "football match tonight",
            "football match tickets",
            "football match tonight",
            "football match tickets",
        ]);
        assert!(TopicChangeDetector::new(2).detect_changes(&seq).is_empty());
    }

    #[test]
    fn test_adjacent_changes_not_merged() {
        let seq = messages(&[
            "football",
            "football",
            "garden",
            "pasta",
            "pasta",
            "pasta",
        ]);
        let changes = TopicChangeDetector::new(2).detect_changes(&seq);
        let indices: Vec<usize> = changes.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn test_empty_texts_count_as_zero_similarity() {
        let seq = messages(&["", "", "", "", ""]);
        let changes = TopicChangeDetector::new(2).detect_changes(&seq);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].index, 2);
        assert_eq!(changes[0].similarity, 0.0);
        assert_eq!(changes[0].confidence, 1.0);
        assert!(changes[0].before_keywords.is_empty());
    }
}
