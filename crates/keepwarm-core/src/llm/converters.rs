//! Message format conversion for different providers
//!
//! Cache breakpoints are never added or moved here: a message carries a
//! `cache_control` block on the wire exactly when the payload marked it.

use crate::llm::messages::{LlmMessage, MessageRole};
use serde_json::{Value, json};

/// Message format converter
pub struct MessageConverter;

impl MessageConverter {
    /// Convert messages for OpenAI-compatible chat completions
    ///
    /// Marked messages use the content-block form understood by OpenRouter
    /// and LiteLLM-style proxies; unmarked messages stay plain strings.
    pub fn to_openai(messages: &[LlmMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|message| match &message.cache_control {
                Some(cache_control) => json!({
                    "role": message.role.to_string(),
                    "content": [{
                        "type": "text",
                        "text": message.content,
                        "cache_control": cache_control,
                    }]
                }),
                None => json!({
                    "role": message.role.to_string(),
                    "content": message.content,
                }),
            })
            .collect()
    }

    /// Convert messages for the Anthropic Messages API
    ///
    /// Returns the top-level `system` value (if any system messages exist)
    /// and the remaining conversation messages.
    pub fn to_anthropic(messages: &[LlmMessage]) -> (Option<Value>, Vec<Value>) {
        let system_blocks: Vec<Value> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(Self::anthropic_text_block)
            .collect();

        let converted = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|message| {
                // cache_control cannot be set on empty text blocks
                if message.is_cache_breakpoint() && !message.content.is_empty() {
                    json!({
                        "role": message.role.to_string(),
                        "content": [Self::anthropic_text_block(message)]
                    })
                } else {
                    json!({
                        "role": message.role.to_string(),
                        "content": message.content
                    })
                }
            })
            .collect();

        let system = if system_blocks.is_empty() {
            None
        } else {
            Some(Value::Array(system_blocks))
        };

        (system, converted)
    }

    fn anthropic_text_block(message: &LlmMessage) -> Value {
        let mut block = json!({
            "type": "text",
            "text": message.content,
        });
        if let Some(cache_control) = &message.cache_control {
            block["cache_control"] = json!(cache_control);
        }
        block
    }
}
