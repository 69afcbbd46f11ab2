use crate::core::conversation::{ConversationSource, MessageRecord, SourceError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Reads conversations exported by the page integration.
///
/// The file is one JSON object mapping chat ids to message arrays:
/// `{ "ana": [ { "text": "...", "speaker": "Ana", ... } ] }`.
/// A message that fails to parse is skipped, the rest of the chat still loads.
pub struct JsonConversationSource {
    path: PathBuf,
    cache: RwLock<Option<BTreeMap<String, Vec<MessageRecord>>>>,
}

impl JsonConversationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    async fn chats(&self) -> Result<BTreeMap<String, Vec<MessageRecord>>, SourceError> {
        if let Some(chats) = self.cache.read().await.as_ref() {
            return Ok(chats.clone());
        }

        let raw = tokio::fs::read_to_string(&self.path).await?;
        let chats = parse_chats(&raw)?;
        tracing::debug!(path = %self.path.display(), chats = chats.len(), "Loaded conversation file");

        *self.cache.write().await = Some(chats.clone());
        Ok(chats)
    }
}

fn parse_chats(raw: &str) -> Result<BTreeMap<String, Vec<MessageRecord>>, SourceError> {
    let document: BTreeMap<String, Vec<serde_json::Value>> = serde_json::from_str(raw)?;

    let mut chats = BTreeMap::new();
    for (chat_id, values) in document {
        let mut messages = Vec::with_capacity(values.len());
        for (position, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<MessageRecord>(value) {
                Ok(message) => messages.push(message),
                Err(e) => {
                    tracing::warn!(chat = %chat_id, position, "Skipping malformed message: {}", e)
                }
            }
        }
        chats.insert(chat_id, messages);
    }
    Ok(chats)
}

#[async_trait]
impl ConversationSource for JsonConversationSource {
    async fn load_messages(&self, chat_id: &str) -> Result<Vec<MessageRecord>, SourceError> {
        let mut chats = self.chats().await?;
        chats
            .remove(chat_id)
            .ok_or_else(|| SourceError::ChatNotFound(chat_id.to_string()))
    }

    async fn list_chats(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.chats().await?.into_keys().collect())
    }
}
