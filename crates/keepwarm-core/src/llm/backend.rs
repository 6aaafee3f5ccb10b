//! Completion backend contract used by the warming loop

use crate::error::BackendError;
use crate::llm::messages::LlmMessage;
use crate::llm::usage::CacheUsage;
use async_trait::async_trait;
use serde_json::{Map, Value, json};

/// Output budget of a keep-alive ping: enough to register a cache read,
/// not enough to generate content
pub const KEEPALIVE_MAX_TOKENS: u32 = 1;

/// A non-streaming completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub stream: bool,
    pub max_tokens: u32,
    /// Backend-specific parameters; never override the fields above
    pub extra_params: Map<String, Value>,
}

impl CompletionRequest {
    /// Build the minimal request used to refresh a cached prefix
    pub fn keepalive(
        model: impl Into<String>,
        messages: Vec<LlmMessage>,
        extra_params: Map<String, Value>,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
            max_tokens: KEEPALIVE_MAX_TOKENS,
            extra_params,
        }
    }

    /// Merge the extra parameters with provider-shaped required fields.
    ///
    /// Starts from `extra_params` and then writes `model`, `stream`,
    /// `max_tokens` and every entry of `required`, so required values always
    /// take precedence over caller-supplied ones.
    pub fn merged_body(&self, required: Map<String, Value>) -> Value {
        let mut body = self.extra_params.clone();
        body.insert("model".to_string(), json!(self.model));
        body.insert("stream".to_string(), json!(self.stream));
        body.insert("max_tokens".to_string(), json!(self.max_tokens));
        body.extend(required);
        Value::Object(body)
    }
}

/// What the warming loop needs from a completion response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub model: Option<String>,
    pub usage: Option<CacheUsage>,
}

impl CompletionResponse {
    /// Cache-hit tokens, zero when the response carried no usage
    pub fn cache_hit_tokens(&self) -> u64 {
        self.usage.as_ref().map_or(0, CacheUsage::cache_hit_tokens)
    }
}

/// A backend able to serve keep-alive requests.
///
/// Implementations classify every failure into a [`BackendError`]; the
/// warming loop reports it and carries on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short provider name for log lines
    fn name(&self) -> &'static str;

    /// Send one non-streaming completion request
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, BackendError>;
}
