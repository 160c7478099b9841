use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use tracing::{info, instrument, warn};

use crate::event::Subscription;
use crate::room::models::RoomStatus;
use crate::shared::AppState;

use super::socket::{Connection, SocketWrapper};

/// WebSocket endpoint for the statusChanged subscription
///
/// GET /subscriptions
/// Every occupancy transition after the upgrade is pushed as a STATUS_CHANGED frame
#[instrument(name = "websocket_handler", skip(state, ws))]
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    info!("Status subscription requested");

    ws.on_upgrade(move |socket| {
        // Subscribe once the socket is live so nothing is pushed into the void
        let updates = state.session_service.subscribe_status();
        serve_subscription(Box::new(socket), updates)
    })
}

/// Drives one subscriber connection until it closes
pub async fn serve_subscription(
    socket: Box<dyn SocketWrapper>,
    updates: Subscription<RoomStatus>,
) {
    info!(topic = %updates.topic(), "Status subscription established");

    match Connection::new(socket, updates).run().await {
        Ok(()) => {
            info!("Status subscription closed cleanly");
        }
        Err(e) => {
            warn!(error = %e, "Status subscription error");
        }
    }
}
