//! Cacheable payloads handed to the warmer

use crate::error::{WarmError, WarmResult};
use crate::llm::messages::LlmMessage;
use std::path::Path;

/// Something that can yield the ordered, cacheable message prefix.
///
/// The warmer never inspects or edits the messages; it only replays them.
pub trait CacheablePayload: Send + Sync {
    fn cacheable_messages(&self) -> Vec<LlmMessage>;
}

impl CacheablePayload for Vec<LlmMessage> {
    fn cacheable_messages(&self) -> Vec<LlmMessage> {
        self.clone()
    }
}

/// An owned, immutable message prefix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedMessages {
    messages: Vec<LlmMessage>,
}

impl CachedMessages {
    pub fn new(messages: Vec<LlmMessage>) -> Self {
        Self { messages }
    }

    /// Parse a JSON array of messages
    pub fn from_json_str(json: &str) -> WarmResult<Self> {
        let messages: Vec<LlmMessage> = serde_json::from_str(json)
            .map_err(|e| WarmError::config(format!("invalid message list: {}", e)))?;
        Ok(Self::new(messages))
    }

    /// Load a JSON array of messages from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> WarmResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages carrying a cache breakpoint
    pub fn breakpoints(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_cache_breakpoint())
            .count()
    }
}

impl CacheablePayload for CachedMessages {
    fn cacheable_messages(&self) -> Vec<LlmMessage> {
        self.messages.clone()
    }
}
