//! LLM-facing types: messages, the backend contract and HTTP backends

pub mod backend;
pub mod converters;
pub mod messages;
pub mod providers;
pub mod usage;

pub use backend::{CompletionBackend, CompletionRequest, CompletionResponse, KEEPALIVE_MAX_TOKENS};
pub use messages::{CacheControl, LlmMessage, MessageRole};
pub use providers::{AnthropicBackend, OpenAiCompatibleBackend, backend_from_config};
pub use usage::CacheUsage;
