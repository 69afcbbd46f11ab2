// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "conversation/mod.rs"]
pub mod conversation;
