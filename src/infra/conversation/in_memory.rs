// In-memory implementation of ConversationSource.
//
// Used when the page integration hands conversations over directly instead of
// exporting them to a file, and by tests that don't want to touch disk.

use crate::core::conversation::{ConversationSource, MessageRecord, SourceError};
use async_trait::async_trait;
use dashmap::DashMap;

/// Chat id -> messages, safe to share across tasks without a Mutex.
#[derive(Default)]
pub struct InMemoryConversationSource {
    chats: DashMap<String, Vec<MessageRecord>>,
}

impl InMemoryConversationSource {
    pub fn new() -> Self {
        Self {
            chats: DashMap::new(),
        }
    }

    /// Replaces the messages stored for `chat_id`.
    pub fn insert_chat(&self, chat_id: impl Into<String>, messages: Vec<MessageRecord>) {
        self.chats.insert(chat_id.into(), messages);
    }

    /// Appends one freshly scraped message to a chat, creating it if needed.
    pub fn push_message(&self, chat_id: &str, message: MessageRecord) {
        self.chats
            .entry(chat_id.to_string())
            .or_default()
            .push(message);
    }
}

#[async_trait]
impl ConversationSource for InMemoryConversationSource {
    async fn load_messages(&self, chat_id: &str) -> Result<Vec<MessageRecord>, SourceError> {
        self.chats
            .get(chat_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SourceError::ChatNotFound(chat_id.to_string()))
    }

    async fn list_chats(&self) -> Result<Vec<String>, SourceError> {
        let mut ids: Vec<String> = self.chats.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}
