use tracing::{info, instrument, warn};

use crate::event::{StatusBus, Subscription, STATUS_CHANGED_TOPIC};
use crate::message::{
    models::MessageModel,
    service::{MessageService, DEFAULT_MESSAGE_LIMIT},
};
use crate::room::{models::RoomStatus, service::OccupancyService};
use crate::shared::AppError;

/// Entry point for every stall operation a client can invoke
///
/// Composes the occupancy state machine, the message store and the status
/// bus. Identity mismatches are answered with inert results, not errors.
pub struct SessionService {
    occupancy: OccupancyService,
    messages: MessageService,
    event_bus: StatusBus,
}

impl SessionService {
    pub fn new(occupancy: OccupancyService, messages: MessageService, event_bus: StatusBus) -> Self {
        Self {
            occupancy,
            messages,
            event_bus,
        }
    }

    pub fn get_status(&self) -> RoomStatus {
        self.occupancy.status()
    }

    /// The latest messages, newest first
    pub async fn get_messages(&self) -> Result<Vec<MessageModel>, AppError> {
        self.messages.recent(DEFAULT_MESSAGE_LIMIT).await
    }

    /// Posts a message on behalf of the current occupant
    ///
    /// Anyone else gets the error placeholder back and nothing is stored.
    #[instrument(skip(self, text))]
    pub async fn post_message(
        &self,
        text: String,
        requester_id: String,
        signature: Option<String>,
    ) -> Result<MessageModel, AppError> {
        if !self.occupancy.status().is_occupied_by(&requester_id) {
            warn!(requester_id = %requester_id, "Message from non-occupant refused");
            return Ok(MessageModel::error_placeholder());
        }

        // A leave or expiry between the check and the insert still stores the message
        self.messages.append(text, requester_id, signature).await
    }

    pub fn enter_room(&self, requester_id: &str) -> RoomStatus {
        self.occupancy.enter(requester_id)
    }

    pub fn leave_room(&self, requester_id: &str) -> RoomStatus {
        self.occupancy.leave(requester_id)
    }

    /// Stream of statuses, one per transition from now on
    pub fn subscribe_status(&self) -> Subscription<RoomStatus> {
        self.event_bus.subscribe(STATUS_CHANGED_TOPIC)
    }

    /// Stops background work ahead of process exit
    pub fn shutdown(&self) {
        info!("Shutting down stall session service");
        self.occupancy.shutdown();
    }
}
