// Conversation context pipeline for AI reply suggestions.
//
// **Architecture Overview:**
// - `core/` = Business logic (pure, platform-agnostic)
// - `infra/` = Implementations of core traits (files, in-memory hand-off)
//
// The binary in `main.rs` is only a composition root; embedding hosts use
// the entry points re-exported here.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;

pub use crate::core::conversation::{
    detect_topic_changes, get_summarized_context, select_relevant_messages, AssembledContext,
    ChangePoint, ContextAssembler, ContextConfig, MessageRecord, SummaryResult,
};
