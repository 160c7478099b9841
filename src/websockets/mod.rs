// Public API
pub use handler::{serve_subscription, websocket_handler};
pub use messages::{MessageType, WebSocketMessage};
pub use socket::{Connection, SocketError, SocketWrapper};

// Internal modules
mod handler;
mod messages;
mod socket;
