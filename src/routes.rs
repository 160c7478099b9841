use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shared::AppState;
use crate::{message, room, websockets};

/// Builds the HTTP surface over the stall session API
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/status", get(room::get_status))
        .route("/room/enter", post(room::enter_room))
        .route("/room/leave", post(room::leave_room))
        .route(
            "/messages",
            get(message::list_messages).post(message::add_message),
        )
        .route("/subscriptions", get(websockets::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
