pub mod in_memory;
pub mod json_source;

pub use in_memory::InMemoryConversationSource;
pub use json_source::JsonConversationSource;
