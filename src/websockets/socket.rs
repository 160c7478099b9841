use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use thiserror::Error;
use tracing::debug;

use super::messages::WebSocketMessage;
use crate::event::Subscription;
use crate::room::models::RoomStatus;

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_)) => continue, // Ignore binary/ping/pong
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
                None => return Ok(None), // Connection closed
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// A subscriber's WebSocket connection to the status feed
///
/// Pushes every status update to the client until either side goes away.
/// Dropping the connection drops its subscription, which unregisters it.
pub struct Connection {
    socket: Box<dyn SocketWrapper>,
    updates: Subscription<RoomStatus>,
}

impl Connection {
    pub fn new(socket: Box<dyn SocketWrapper>, updates: Subscription<RoomStatus>) -> Self {
        Self { socket, updates }
    }

    /// Run the connection - handles both sending and receiving until disconnect
    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                // Status updates from the bus to the client
                update = self.updates.recv() => {
                    match update {
                        Some(status) => {
                            let frame = WebSocketMessage::status_changed(&status)?;
                            self.socket.send_message(serde_json::to_string(&frame)?).await?
                        }
                        None => break, // Unsubscribed, disconnect
                    }
                }

                // The feed is push-only, anything the client sends is answered with an error
                msg = self.socket.receive_message() => {
                    match msg {
                        Ok(Some(message)) => {
                            debug!(message = %message, "Ignoring inbound subscription message");
                            let frame = WebSocketMessage::error(
                                "statusChanged is a read-only subscription".to_string(),
                            )?;
                            self.socket.send_message(serde_json::to_string(&frame)?).await?
                        }
                        Ok(None) => break, // Client disconnected
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        // Clean disconnect
        let _ = self.socket.close().await;
        Ok(())
    }
}
