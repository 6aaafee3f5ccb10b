//! Configuration for keepwarm
//!
//! Settings are layered: TOML file, then environment variables, then CLI
//! flags. The keep-alive delay additionally has a per-arming override
//! (see [`delay`]).

pub mod delay;
pub mod timeouts;
pub mod warming;

pub use delay::{DelaySource, EnvDelaySource, KEEPALIVE_DELAY_ENV, resolve_delay};
pub use warming::{BackendConfig, BackendProvider, WarmingConfig};
