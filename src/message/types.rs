use serde::Deserialize;

/// Request payload for posting a message
#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub text: String,
    pub userid: String,
    #[serde(default)]
    pub signature: Option<String>,
}
