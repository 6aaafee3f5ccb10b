//! Prompt-cache warming scheduler
//!
//! [`CacheWarmer`] is armed with a payload by the caller and keeps the
//! backend's cache entry for that payload alive with a bounded number of
//! minimal pings, run from a single background task.

mod gate;
mod payload;
mod reporter;
mod state;
mod warmer;
mod worker;


pub use gate::{GateHold, WarmGate};
pub use payload::{CacheablePayload, CachedMessages};
pub use reporter::{TracingReporter, WarmReporter};
pub use state::{LoopPhase, WarmSnapshot};
pub use warmer::{CacheWarmer, CacheWarmerBuilder};
