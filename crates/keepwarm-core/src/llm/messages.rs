//! LLM message types carried by a warming payload

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache control marker for prompt caching
///
/// When attached to a message, the backend caches the prompt prefix up to
/// and including that message. Anthropic's ephemeral cache lives for five
/// minutes and the TTL is refreshed on every read, which is what the
/// keep-alive pings rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    /// Cache type - currently only "ephemeral" is supported
    #[serde(rename = "type")]
    pub control_type: String,
}

impl CacheControl {
    /// Create a new ephemeral cache control
    pub fn ephemeral() -> Self {
        Self {
            control_type: "ephemeral".to_string(),
        }
    }
}

impl Default for CacheControl {
    fn default() -> Self {
        Self::ephemeral()
    }
}

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the cacheable prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: String,
    /// Cache breakpoint marker, set by whoever built the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

impl LlmMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            cache_control: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Mark this message as a cache breakpoint
    pub fn with_cache_control(mut self) -> Self {
        self.cache_control = Some(CacheControl::ephemeral());
        self
    }

    pub fn is_cache_breakpoint(&self) -> bool {
        self.cache_control.is_some()
    }
}
