use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, instrument};

use super::service::OccupancyService;

/// Polls the session armed as `generation` until it is over
///
/// The deadline is re-checked on every tick rather than slept on once, so a
/// late tick still expires the session as soon as it runs. The loop ends when
/// the session expires or is no longer the current one.
#[instrument(skip(occupancy))]
pub(super) async fn watch_session(
    occupancy: OccupancyService,
    generation: u64,
    poll_interval: Duration,
) {
    debug!(
        generation = generation,
        poll_interval_ms = poll_interval.as_millis() as u64,
        "Starting session expiry watcher"
    );

    let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if occupancy.expire_if_due(generation) {
            break;
        }
    }

    debug!(generation = generation, "Session expiry watcher finished");
}
