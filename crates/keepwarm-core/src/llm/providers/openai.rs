//! OpenAI-compatible chat completions backend
//!
//! Covers OpenAI itself and the compatible APIs that report prompt cache
//! hits (DeepSeek's `prompt_cache_hit_tokens`, OpenRouter and LiteLLM
//! proxies forwarding Anthropic's `cache_read_input_tokens`).

use super::{error_utils, parse_completion};
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::llm::backend::{CompletionBackend, CompletionRequest, CompletionResponse};
use crate::llm::converters::MessageConverter;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::instrument;

const PROVIDER: &str = "OpenAI";

pub struct OpenAiCompatibleBackend {
    config: BackendConfig,
    http_client: Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(config: BackendConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn build_body(request: &CompletionRequest) -> Value {
        let mut required = Map::new();
        required.insert(
            "messages".to_string(),
            json!(MessageConverter::to_openai(&request.messages)),
        );
        request.merged_body(required)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, request), fields(model = %request.model), level = "debug")]
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        let url = format!("{}/chat/completions", self.config.base_url());
        let body = Self::build_body(&request);

        let mut http_request = self
            .http_client
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(&body);

        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.bearer_auth(api_key);
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
