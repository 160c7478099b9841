use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

use stall::{
    websockets::{MessageType, SocketError, SocketWrapper, WebSocketMessage},
    RoomStatus,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Server side of an in-process socket pair
pub struct MockSocket {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

/// Client side of an in-process socket pair
pub struct MockClient {
    to_server: Option<mpsc::UnboundedSender<String>>,
    from_server: mpsc::UnboundedReceiver<String>,
}

pub fn socket_pair() -> (MockSocket, MockClient) {
    let (to_server, inbound) = mpsc::unbounded_channel();
    let (outbound, from_server) = mpsc::unbounded_channel();

    (
        MockSocket { inbound, outbound },
        MockClient {
            to_server: Some(to_server),
            from_server,
        },
    )
}

#[async_trait]
impl SocketWrapper for MockSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.outbound
            .send(message)
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        Ok(self.inbound.recv().await)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        Ok(())
    }
}

impl MockClient {
    /// Waits for the next frame pushed by the server
    pub async fn next_frame(&mut self) -> WebSocketMessage {
        let raw = tokio::time::timeout(Duration::from_secs(5), self.from_server.recv())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Server closed the connection");
        serde_json::from_str(&raw).expect("Frame should be a WebSocketMessage")
    }

    /// Waits for the next frame and decodes it as a status update
    pub async fn next_status(&mut self) -> RoomStatus {
        let frame = self.next_frame().await;
        assert_eq!(frame.message_type, MessageType::StatusChanged);
        serde_json::from_value(frame.payload).expect("Payload should be a RoomStatus")
    }

    /// True when nothing arrives within `window`
    pub async fn stays_quiet_for(&mut self, window: Duration) -> bool {
        tokio::time::timeout(window, self.from_server.recv())
            .await
            .is_err()
    }

    pub fn send(&self, message: &str) {
        if let Some(sender) = &self.to_server {
            let _ = sender.send(message.to_string());
        }
    }

    /// Closes the client side, which ends the server connection
    pub fn disconnect(&mut self) {
        self.to_server = None;
    }
}
