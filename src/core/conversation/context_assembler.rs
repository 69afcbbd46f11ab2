// =============================================================================
// CONTEXT ASSEMBLY
// =============================================================================
//
// Composition root of the pipeline. Builds the scorer, detector, selector and
// summarizer once and runs them in order:
// select -> validate -> detect topic changes -> summarize into context lines.
//
// All steps are pure; an assembler can be shared freely across tasks.

use super::conversation_models::{
    ChangePoint, ContextConfig, MessageRecord, QualityReport, SummaryResult,
};
use super::message_selector::{SmartMessageSelector, DEFAULT_TARGET_COUNT};
use super::relevance::RelevanceScorer;
use super::summarizer::ConversationSummarizer;
use super::topic_changes::{TopicChangeDetector, DEFAULT_WINDOW_SIZE};
use serde::Serialize;

/// Everything produced for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledContext {
    /// Lines ready for prompt construction, top to bottom
    pub lines: Vec<String>,
    pub topic_changes: Vec<ChangePoint>,
    pub quality: QualityReport,
    pub selected_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone)]
pub struct ContextAssembler {
    config: ContextConfig,
    selector: SmartMessageSelector,
    detector: TopicChangeDetector,
    summarizer: ConversationSummarizer,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

impl ContextAssembler {
    pub fn new(config: ContextConfig) -> Self {
        Self {
            selector: SmartMessageSelector::new(RelevanceScorer::new()),
            detector: TopicChangeDetector::new(config.topic_window),
            summarizer: ConversationSummarizer::new(),
            config,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Runs the whole pipeline over one conversation.
    ///
    /// `topic_hint` overrides the configured hint when given. Quality issues
    /// and topic changes are reported alongside the lines, never as errors.
    pub fn assemble(&self, messages: &[MessageRecord], topic_hint: Option<&str>) -> AssembledContext {
        let hint = topic_hint.or(self.config.topic_hint.as_deref());

        let selected = self
            .selector
            .select(messages, hint, self.config.target_count);
        let quality = self.selector.validate_quality(&selected);
        let topic_changes = self.detector.detect_changes(&selected);
        let lines = self.summarizer.summarized_context(&selected);

        if !quality.valid {
            tracing::warn!(
                quality = %quality.quality,
                issues = quality.issues.len(),
                "Assembled context has quality issues"
            );
        }
        tracing::info!(
            total = messages.len(),
            selected = selected.len(),
            topic_changes = topic_changes.len(),
            lines = lines.len(),
            "Context assembled"
        );

        AssembledContext {
            lines,
            topic_changes,
            quality,
            selected_count: selected.len(),
            total_count: messages.len(),
        }
    }

    pub fn summarize(&self, messages: &[MessageRecord]) -> SummaryResult {
        self.summarizer.summarize(messages)
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Picks a bounded, chronological subset of a long conversation.
///
/// `target_count` defaults to 30.
pub fn select_relevant_messages(
    messages: &[MessageRecord],
    topic_hint: &str,
    target_count: Option<usize>,
) -> Vec<MessageRecord> {
    SmartMessageSelector::default().select(
        messages,
        Some(topic_hint),
        target_count.unwrap_or(DEFAULT_TARGET_COUNT),
    )
}

/// Finds likely topic boundaries. `window_size` defaults to 5.
pub fn detect_topic_changes(
    messages: &[MessageRecord],
    window_size: Option<usize>,
) -> Vec<ChangePoint> {
    TopicChangeDetector::new(window_size.unwrap_or(DEFAULT_WINDOW_SIZE)).detect_changes(messages)
}

/// Renders a conversation as context lines, summarizing older history.
pub fn get_summarized_context(messages: &[MessageRecord]) -> Vec<String> {
    ConversationSummarizer::new().summarized_context(messages)
}

// =============================================================================
// TESTS
// =============================================================================
