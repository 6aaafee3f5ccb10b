//! HTTP completion backends

mod anthropic;
pub mod error_utils;
mod openai;

pub use anthropic::{AnthropicBackend, DEFAULT_API_VERSION};
pub use openai::OpenAiCompatibleBackend;

use crate::config::{BackendConfig, BackendProvider, timeouts};
use crate::error::{BackendError, WarmError, WarmResult};
use crate::llm::backend::{CompletionBackend, CompletionResponse};
use crate::llm::usage::CacheUsage;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

/// Build the backend selected by `config.provider`
pub fn backend_from_config(config: &BackendConfig) -> WarmResult<Arc<dyn CompletionBackend>> {
    let http_client = Client::builder()
        .connect_timeout(timeouts::backend::connection_timeout())
        .build()
        .map_err(|e| WarmError::config(format!("failed to build HTTP client: {}", e)))?;

    let backend: Arc<dyn CompletionBackend> = match config.provider {
        BackendProvider::Anthropic => Arc::new(AnthropicBackend::new(config.clone(), http_client)),
        BackendProvider::OpenAi => {
            Arc::new(OpenAiCompatibleBackend::new(config.clone(), http_client))
        }
    };
    Ok(backend)
}

/// Extract the parts of a completion body the warming loop needs.
///
/// A missing `usage` is not an error; a `usage` that is not an object, or
/// whose counters are not numbers, is.
pub(crate) fn parse_completion(body: &Value) -> Result<CompletionResponse, BackendError> {
    if !body.is_object() {
        return Err(BackendError::malformed("response body is not a JSON object"));
    }

    let usage = match body.get("usage") {
        None | Some(Value::Null) => None,
        Some(usage @ Value::Object(_)) => Some(
            serde_json::from_value::<CacheUsage>(usage.clone())
                .map_err(|e| BackendError::malformed(format!("invalid usage record: {}", e)))?,
        ),
        Some(_) => return Err(BackendError::malformed("usage is not an object")),
    };

    Ok(CompletionResponse {
        model: body.get("model").and_then(Value::as_str).map(str::to_string),
        usage,
    })
}
