// Library crate for the stall server
// This file exposes the public API for integration tests

pub mod config;
pub mod event;
pub mod message;
pub mod room;
pub mod routes;
pub mod session;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use event::{EventBus, StatusBus, Subscription, STATUS_CHANGED_TOPIC};
pub use message::{models::MessageModel, repository::MessageRepository};
pub use room::{models::RoomStatus, service::OccupancyService};
pub use session::SessionService;
pub use shared::{AppError, AppState};
pub use websockets::{Connection, MessageType, SocketWrapper, WebSocketMessage};
