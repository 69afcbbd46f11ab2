// Shared text heuristics for the context pipeline.
//
// These word lists are compatibility tables: downstream scoring depends on
// their exact contents, so they are reproduced literally.

use std::collections::HashSet;

/// First words that mark a message as a question.
pub const QUESTION_STARTERS: &[&str] = &[
    "what", "when", "where", "who", "why", "how", "which", "can", "could", "would", "should",
    "is", "are", "do", "does", "did",
];

/// Minimum token length (exclusive) for keyword extraction.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Classifies a message text as a question.
///
/// A question either contains `?` or starts with one of [`QUESTION_STARTERS`].
/// Only the first whitespace-delimited token is checked, as-is after
/// lower-casing.
pub fn is_question(text: &str) -> bool {
    if text.contains('?') {
        return true;
    }

    match text.split_whitespace().next() {
        Some(first) => {
            let first = first.to_lowercase();
            QUESTION_STARTERS.contains(&first.as_str())
        }
        None => false,
    }
}

/// Lower-cases a raw token and drops every non-alphanumeric character.
pub fn normalize_token(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Extracts keyword tokens from `text`, in order, duplicates included.
///
/// Keeps tokens longer than 3 chars that are not in `stop_words`.
pub fn keyword_tokens(text: &str, stop_words: &[&str]) -> Vec<String> {
    text.split_whitespace()
        .map(normalize_token)
        .filter(|token| token.chars().count() > MIN_KEYWORD_CHARS)
        .filter(|token| !stop_words.contains(&token.as_str()))
        .collect()
}

/// Keyword set that remembers first-appearance order.
///
/// Membership is a set; iteration order is deterministic so sample keywords
/// are stable between runs.
#[derive(Debug, Clone, Default)]
pub struct OrderedKeywords {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keyword: String) {
        if self.seen.insert(keyword.clone()) {
            self.ordered.push(keyword);
        }
    }

    pub fn extend(&mut self, keywords: impl IntoIterator<Item = String>) {
        for keyword in keywords {
            self.insert(keyword);
        }
    }

    pub fn set(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// First `n` keywords in appearance order.
    pub fn sample(&self, n: usize) -> Vec<String> {
        self.ordered.iter().take(n).cloned().collect()
    }
}

/// Takes the first `max_chars` characters of `text`, appending `...` when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_table() {
        assert!(is_question("are you free?"));
        assert!(is_question("Can you help"));
        assert!(!is_question("I will call you"));
        assert!(!is_question(""));
    }

    #[test]
    fn test_question_first_word_only() {
        assert!(!is_question("I wonder what time it is"));
        assert!(is_question("  WHERE are we meeting"));
        // punctuation glued to the first word defeats the match
        assert!(!is_question("How, exactly"));
        assert!(is_question("ok?"));
    }

    #[test]
    fn test_keyword_tokens_filters_short_and_stop_words() {
        let tokens = keyword_tokens("The Project, the BEACH! and a trip.", &["beach"]);
        assert_eq!(tokens, vec!["project".to_string(), "trip".to_string()]);
    }

    #[test]
    fn test_keyword_tokens_empty_text() {
        assert!(keyword_tokens("", &[]).is_empty());
        assert!(keyword_tokens("   ", &[]).is_empty());
    }

    #[test]
    fn test_ordered_keywords_dedupes_and_keeps_order() {
        let mut keywords = OrderedKeywords::new();
        keywords.extend(vec![
            "zeta".to_string(),
            "alpha".to_string(),
            "zeta".to_string(),
            "beta".to_string(),
        ]);
        assert_eq!(keywords.len(), 3);
        assert_eq!(keywords.sample(2), vec!["zeta".to_string(), "alpha".to_string()]);
        assert!(keywords.set().contains("beta"));
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 80), "short");
        assert_eq!(excerpt("abcdef", 3), "abc...");
    }
}
