use actix_web::web;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::AppState;

/// Periodically forgets browser contexts that hold no identity, along with
/// page scopes that have nothing in flight.
pub async fn start_context_prune_task(state: web::Data<AppState>, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let pruned = state.sessions.prune();
        for context in &pruned {
            state.view_scopes.close(*context);
        }
        let idle_scopes = state.view_scopes.prune_idle();

        tracing::info!(
            contexts = pruned.len(),
            idle_scopes,
            remaining = state.sessions.len(),
            "pruned browser contexts"
        );
    }
}
