use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::{models::RoomStatus, types::OccupancyRequest};
use crate::shared::AppState;

/// HTTP handler for reading the stall status
///
/// GET /status
#[instrument(name = "get_status", skip(state))]
pub async fn get_status(State(state): State<AppState>) -> Json<RoomStatus> {
    Json(state.session_service.get_status())
}

/// HTTP handler for claiming the stall
///
/// POST /room/enter
/// Returns the resulting status, which names someone else if the stall was taken
#[instrument(name = "enter_room", skip(state))]
pub async fn enter_room(
    State(state): State<AppState>,
    Json(request): Json<OccupancyRequest>,
) -> Json<RoomStatus> {
    let status = state.session_service.enter_room(&request.userid);

    info!(
        requester_id = %request.userid,
        granted = status.is_occupied_by(&request.userid),
        "Enter request handled"
    );

    Json(status)
}

/// HTTP handler for releasing the stall
///
/// POST /room/leave
#[instrument(name = "leave_room", skip(state))]
pub async fn leave_room(
    State(state): State<AppState>,
    Json(request): Json<OccupancyRequest>,
) -> Json<RoomStatus> {
    Json(state.session_service.leave_room(&request.userid))
}
