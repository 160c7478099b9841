use serde::Deserialize;

/// Request payload for entering or leaving the stall
#[derive(Debug, Deserialize)]
pub struct OccupancyRequest {
    pub userid: String,
}
