// Core conversation module - context selection and summarization logic.
// Following the same pattern as the other core feature modules.

pub mod context_assembler;
pub mod conversation_models;
pub mod conversation_source;
pub mod message_selector;
pub mod relevance;
pub mod summarizer;
pub mod text_analysis;
pub mod topic_changes;

pub use context_assembler::{
    detect_topic_changes, get_summarized_context, select_relevant_messages, AssembledContext,
    ContextAssembler,
};
pub use conversation_models::*;
pub use conversation_source::{ConversationSource, SourceError};
pub use message_selector::SmartMessageSelector;
pub use relevance::{RelevanceScorer, ScoreBreakdown};
pub use summarizer::ConversationSummarizer;
pub use topic_changes::TopicChangeDetector;
