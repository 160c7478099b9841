use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::{expiry_task::watch_session, models::RoomStatus};
use crate::event::{StatusBus, STATUS_CHANGED_TOPIC};

/// Timing of an occupancy session
#[derive(Debug, Clone)]
pub struct OccupancyConfig {
    /// How long an occupant may hold the stall
    pub session_window: Duration,
    /// How often the armed session is checked for expiry
    pub poll_interval: Duration,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            session_window: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Mutable occupancy record, only touched with the lock held
#[derive(Debug, Default)]
struct OccupancyState {
    status: RoomStatus,
    /// Monotonic deadline of the current session
    deadline: Option<Instant>,
    /// Bumped on every `enter` so stale watchers can tell they are stale
    generation: u64,
    watcher: Option<JoinHandle<()>>,
}

/// Single-occupant state machine for the stall
///
/// `enter`, `leave` and expiry all run under one lock, and every transition
/// is published on the status topic before the lock is released, so
/// observers see transitions in the order they happened.
#[derive(Clone)]
pub struct OccupancyService {
    state: Arc<Mutex<OccupancyState>>,
    event_bus: StatusBus,
    config: OccupancyConfig,
}

impl OccupancyService {
    pub fn new(event_bus: StatusBus, config: OccupancyConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(OccupancyState::default())),
            event_bus,
            config,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, OccupancyState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current status of the stall
    pub fn status(&self) -> RoomStatus {
        self.lock_state().status.clone()
    }

    /// Claims the stall for `requester_id` if nobody holds it
    ///
    /// While occupied this is a no-op that hands back the current status:
    /// the occupant and their deadline are left untouched. An empty
    /// `requester_id` never occupies the stall.
    #[instrument(skip(self))]
    pub fn enter(&self, requester_id: &str) -> RoomStatus {
        let mut state = self.lock_state();

        if requester_id.is_empty() {
            debug!("Enter without a requester id ignored");
            return state.status.clone();
        }

        if state.status.occupied {
            debug!(
                requester_id = %requester_id,
                occupant_id = %state.status.occupant_id,
                "Stall already occupied, ignoring enter"
            );
            return state.status.clone();
        }

        let window = self.config.session_window;
        let window_millis = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let expires_at = Utc::now() + chrono::Duration::milliseconds(window_millis);

        // Vacant states never carry a watcher, but make sure of it
        if let Some(stale) = state.watcher.take() {
            stale.abort();
        }

        state.generation += 1;
        state.deadline = Some(Instant::now() + window);
        state.status = RoomStatus::occupied_by(requester_id, expires_at);
        state.watcher = Some(tokio::spawn(watch_session(
            self.clone(),
            state.generation,
            self.config.poll_interval,
        )));

        info!(
            occupant_id = %requester_id,
            expires_at = %expires_at,
            generation = state.generation,
            "Stall occupied"
        );

        self.publish(&state.status);
        state.status.clone()
    }

    /// Releases the stall if `requester_id` is the current occupant
    ///
    /// Anyone else gets the unchanged status back.
    #[instrument(skip(self))]
    pub fn leave(&self, requester_id: &str) -> RoomStatus {
        let mut state = self.lock_state();

        if !state.status.is_occupied_by(requester_id) {
            debug!(
                requester_id = %requester_id,
                occupant_id = %state.status.occupant_id,
                "Leave from non-occupant ignored"
            );
            return state.status.clone();
        }

        if let Some(watcher) = state.watcher.take() {
            watcher.abort();
        }
        state.deadline = None;
        state.status = RoomStatus::vacant();

        info!(occupant_id = %requester_id, "Occupant left the stall");

        self.publish(&state.status);
        state.status.clone()
    }

    /// Vacates the stall if session `generation` is still current and due
    ///
    /// Returns true once the watcher for that session has nothing left to do.
    pub(super) fn expire_if_due(&self, generation: u64) -> bool {
        let mut state = self.lock_state();

        if !state.status.occupied || state.generation != generation {
            debug!(generation = generation, "Watcher outlived its session");
            return true;
        }

        let due = state
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        if !due {
            return false;
        }

        let occupant_id = std::mem::take(&mut state.status.occupant_id);
        // The running watcher is the one finishing here, just detach it
        state.watcher = None;
        state.deadline = None;
        state.status = RoomStatus::vacant();

        info!(occupant_id = %occupant_id, generation = generation, "Session expired");

        self.publish(&state.status);
        true
    }

    /// Cancels the armed expiry watcher, if any
    pub fn shutdown(&self) {
        if let Some(watcher) = self.lock_state().watcher.take() {
            watcher.abort();
            info!("Cancelled session expiry watcher");
        }
    }

    fn publish(&self, status: &RoomStatus) {
        let receivers = self.event_bus.publish(STATUS_CHANGED_TOPIC, status.clone());
        debug!(receivers = receivers, occupied = status.occupied, "Status change published");
    }
}
