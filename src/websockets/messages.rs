use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::room::models::RoomStatus;

/// Message types for WebSocket communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Server -> Client
    StatusChanged,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    /// Create a STATUS_CHANGED message
    pub fn status_changed(status: &RoomStatus) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            MessageType::StatusChanged,
            serde_json::to_value(status)?,
        ))
    }

    /// Create an ERROR message
    pub fn error(message: String) -> Result<Self, serde_json::Error> {
        let payload = ErrorPayload { message };
        Ok(Self::new(MessageType::Error, serde_json::to_value(payload)?))
    }
}
