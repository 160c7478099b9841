use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id carried by the placeholder returned when a post is refused
pub const ERROR_MESSAGE_ID: &str = "error";
const ERROR_MESSAGE_TEXT: &str = "An error occurred, please refresh the page";

/// A chat message posted in the stall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageModel {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    /// Optional display name, empty when unsigned
    pub signature: String,
    /// Occupant that posted the message, kept off the wire
    #[serde(skip_serializing, default)]
    pub author_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    /// Creates a new message with a generated id stamped with the current time
    pub fn new(text: String, author_id: String, signature: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            signature: signature.unwrap_or_default(),
            author_id,
            // Millisecond precision is what the store keeps
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Message-shaped result handed back when a post is refused
    pub fn error_placeholder() -> Self {
        Self {
            id: ERROR_MESSAGE_ID.to_string(),
            text: ERROR_MESSAGE_TEXT.to_string(),
            signature: String::new(),
            author_id: String::new(),
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn is_error(&self) -> bool {
        self.id == ERROR_MESSAGE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message() {
        let message = MessageModel::new("hello".to_string(), "u1".to_string(), None);

        assert!(!message.id.is_empty());
        assert_eq!(message.text, "hello");
        assert_eq!(message.signature, "");
        assert_eq!(message.author_id, "u1");
        assert!(!message.is_error());
        assert_eq!(message.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = MessageModel::new("a".to_string(), "u1".to_string(), None);
        let b = MessageModel::new("a".to_string(), "u1".to_string(), None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_error_placeholder() {
        let message = MessageModel::error_placeholder();

        assert!(message.is_error());
        assert_eq!(message.id, "error");
        assert_eq!(message.text, "An error occurred, please refresh the page");
        assert_eq!(message.signature, "");
    }

    #[test]
    fn test_author_is_not_serialized() {
        let message =
            MessageModel::new("hi".to_string(), "secret-id".to_string(), Some("Bob".to_string()));

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["_id"], message.id.as_str());
        assert_eq!(value["text"], "hi");
        assert_eq!(value["signature"], "Bob");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("author_id").is_none());
        assert!(!value.to_string().contains("secret-id"));
    }
}
