//! keepwarm core library
//!
//! Keeps a completion backend's server-side prompt cache warm between user
//! requests. The caller arms a [`CacheWarmer`] with the cacheable message
//! prefix it just sent; a background task then replays that prefix with a
//! one-token budget every few minutes, a bounded number of times, so the
//! cache entry's TTL keeps getting refreshed while the user is idle.
//!
//! ```no_run
//! use keepwarm_core::{CacheWarmer, CachedMessages, LlmMessage, WarmingConfig};
//! use keepwarm_core::llm::backend_from_config;
//! use std::sync::Arc;
//!
//! # async fn demo() -> keepwarm_core::WarmResult<()> {
//! let mut config = WarmingConfig::default();
//! config.ping_count = 3;
//! config.apply_env()?;
//!
//! let backend = backend_from_config(&config.backend)?;
//! let warmer = CacheWarmer::builder(config, backend).build()?;
//!
//! let payload = Arc::new(CachedMessages::new(vec![
//!     LlmMessage::system("You are a coding assistant.").with_cache_control(),
//! ]));
//! warmer.arm(payload);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod utils;
pub mod warming;

// Re-export commonly used types
pub use config::{BackendConfig, BackendProvider, WarmingConfig};
pub use error::{BackendError, WarmError, WarmResult};
pub use llm::{CompletionBackend, CompletionRequest, CompletionResponse, LlmMessage};
pub use warming::{
    CacheWarmer, CacheablePayload, CachedMessages, LoopPhase, TracingReporter, WarmGate,
    WarmReporter, WarmSnapshot,
};
