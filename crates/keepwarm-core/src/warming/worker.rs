//! The warming loop
//!
//! One task per warmer. It wakes every tick, claims a due ping from the
//! shared state, and sends it with the lock released.

use super::state::DuePing;
use super::warmer::WarmerShared;
use crate::config::timeouts;
use crate::llm::backend::CompletionRequest;
use crate::utils::format_tokens;
use std::sync::Arc;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

enum Tick {
    Stop,
    Idle,
    Fire(DuePing),
}

pub(crate) async fn run(shared: Arc<WarmerShared>) {
    let tick = timeouts::warming::tick();

    loop {
        tokio::select! {
            _ = shared.shutdown.cancelled() => {}
            _ = sleep(tick) => {}
        }

        match next_tick(&shared) {
            Tick::Stop => break,
            Tick::Idle => continue,
            Tick::Fire(due) => fire(&shared, due).await,
        }
    }

    info!("Cache warming loop stopped");
}

/// Decide what this tick does, in one critical section.
///
/// The disable check and clearing `worker_running` share the lock with
/// `arm`, so an arming racing with exit either sees the loop alive (and
/// the loop then sees the open gate) or sees it gone and launches another.
fn next_tick(shared: &WarmerShared) -> Tick {
    let mut state = shared.state.lock();

    if shared.is_disabled() {
        state.worker_running = false;
        return Tick::Stop;
    }

    match state.take_due_ping(Instant::now()) {
        Some(due) => Tick::Fire(due),
        None => Tick::Idle,
    }
}

async fn fire(shared: &WarmerShared, due: DuePing) {
    let config = &shared.config;
    let request = CompletionRequest::keepalive(
        config.model.clone(),
        due.payload.cacheable_messages(),
        config.extra_params.clone(),
    );

    debug!(
        backend = shared.backend.name(),
        model = %config.model,
        remaining = due.remaining_after,
        "Sending keep-alive ping"
    );

    match shared.backend.complete(request).await {
        Ok(response) => {
            let cache_hit_tokens = response.cache_hit_tokens();
            shared.state.lock().pings_succeeded += 1;

            debug!(
                cache_hit_tokens,
                remaining = due.remaining_after,
                "Keep-alive ping succeeded"
            );
            if config.verbose {
                shared.reporter.output(&format!(
                    "Warmed {} cached tokens.",
                    format_tokens(cache_hit_tokens)
                ));
            }
        }
        Err(err) => {
            shared.state.lock().pings_failed += 1;

            debug!(kind = err.kind(), remaining = due.remaining_after, "Keep-alive ping failed");
            shared
                .reporter
                .warning(&format!("Cache warming error: {}", err));
        }
    }
}
