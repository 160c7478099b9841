use super::bus::EventBus;
use crate::room::models::RoomStatus;

/// Topic carrying a fresh [`RoomStatus`] after every occupancy transition
pub const STATUS_CHANGED_TOPIC: &str = "statusChanged";

/// Bus used to fan out room status changes
pub type StatusBus = EventBus<RoomStatus>;
