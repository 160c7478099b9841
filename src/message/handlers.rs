use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::{models::MessageModel, types::AddMessageRequest};
use crate::shared::{AppError, AppState};

/// HTTP handler for listing recent messages
///
/// GET /messages
/// Returns at most 50 messages, newest first
#[instrument(name = "list_messages", skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageModel>>, AppError> {
    let messages = state.session_service.get_messages().await?;

    info!(message_count = messages.len(), "Messages listed");

    Ok(Json(messages))
}

/// HTTP handler for posting a message
///
/// POST /messages
/// A non-occupant gets the error placeholder message with a 200
#[instrument(name = "add_message", skip(state, request))]
pub async fn add_message(
    State(state): State<AppState>,
    Json(request): Json<AddMessageRequest>,
) -> Result<Json<MessageModel>, AppError> {
    let message = state
        .session_service
        .post_message(request.text, request.userid, request.signature)
        .await?;

    info!(message_id = %message.id, accepted = !message.is_error(), "Message post handled");

    Ok(Json(message))
}
