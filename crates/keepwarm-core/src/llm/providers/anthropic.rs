//! Anthropic Messages API backend

use super::{error_utils, parse_completion};
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::llm::backend::{CompletionBackend, CompletionRequest, CompletionResponse};
use crate::llm::converters::MessageConverter;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::instrument;

/// `anthropic-version` header sent when the configuration does not set one
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "Anthropic";

/// Anthropic backend handler
pub struct AnthropicBackend {
    config: BackendConfig,
    http_client: Client,
}

impl AnthropicBackend {
    pub fn new(config: BackendConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Request body for the Messages API.
    ///
    /// The system prompt travels in the top-level `system` field; cache
    /// breakpoints are preserved as the payload set them.
    pub fn build_body(request: &CompletionRequest) -> Value {
        let (system, messages) = MessageConverter::to_anthropic(&request.messages);

        let mut required = Map::new();
        required.insert("messages".to_string(), json!(messages));
        if let Some(system) = system {
            required.insert("system".to_string(), system);
        }

        request.merged_body(required)
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, request), fields(model = %request.model), level = "debug")]
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        let url = format!("{}/v1/messages", self.config.base_url());
        let body = Self::build_body(&request);

        let mut http_request = self
            .http_client
            .post(&url)
            .timeout(self.config.request_timeout)
            .header(
                "anthropic-version",
                self.config
                    .api_version
                    .as_deref()
                    .unwrap_or(DEFAULT_API_VERSION),
            )
            .json(&body);

        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.header("x-api-key", api_key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| error_utils::handle_send_error(e, PROVIDER))?;

        if !response.status().is_success() {
            return Err(error_utils::handle_http_error(response, PROVIDER).await);
        }

        let response_json: Value = response.json().await.map_err(|e| {
            BackendError::malformed(format!("failed to parse {} response: {}", PROVIDER, e))
        })?;

        parse_completion(&response_json)
    }
}
