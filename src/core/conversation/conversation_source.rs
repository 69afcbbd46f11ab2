use super::conversation_models::MessageRecord;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Chat not found: {0}")]
    ChatNotFound(String),
}

/// Where scraped conversations come from.
///
/// The core never cares whether messages were exported to a file or handed
/// over in memory by the page integration.
#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Messages of one chat, oldest first.
    async fn load_messages(&self, chat_id: &str) -> Result<Vec<MessageRecord>, SourceError>;

    /// Known chat ids, sorted.
    async fn list_chats(&self) -> Result<Vec<String>, SourceError>;
}
