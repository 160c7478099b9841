use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{models::MessageModel, repository::MessageRepository};
use crate::shared::AppError;

/// How many messages a listing returns unless asked otherwise
pub const DEFAULT_MESSAGE_LIMIT: usize = 50;

/// Service for appending and listing stall messages
pub struct MessageService {
    repository: Arc<dyn MessageRepository + Send + Sync>,
}

impl MessageService {
    pub fn new(repository: Arc<dyn MessageRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Stores a new message, rejecting empty text before touching the store
    #[instrument(skip(self, text))]
    pub async fn append(
        &self,
        text: String,
        author_id: String,
        signature: Option<String>,
    ) -> Result<MessageModel, AppError> {
        if text.is_empty() {
            warn!(author_id = %author_id, "Rejected empty message");
            return Err(AppError::Validation(
                "Message text must not be empty".to_string(),
            ));
        }

        let message = MessageModel::new(text, author_id, signature);
        self.repository.insert_message(&message).await?;

        info!(
            message_id = %message.id,
            author_id = %message.author_id,
            "Message appended"
        );

        Ok(message)
    }

    /// Newest messages first, at most `limit`
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: usize) -> Result<Vec<MessageModel>, AppError> {
        let messages = self.repository.recent_messages(limit).await?;
        debug!(count = messages.len(), "Recent messages retrieved");
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::repository::InMemoryMessageRepository;
    use crate::shared::test_utils::FailingMessageRepository;

    #[tokio::test]
    async fn test_append_assigns_id_and_time() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let service = MessageService::new(repo.clone());

        let message = service
            .append("hello".to_string(), "u1".to_string(), Some("Bob".to_string()))
            .await
            .unwrap();

        assert!(!message.id.is_empty());
        assert_eq!(message.text, "hello");
        assert_eq!(message.signature, "Bob");
        assert_eq!(repo.message_count(), 1);
    }

    #[tokio::test]
    async fn test_append_rejects_empty_text() {
        let repo = Arc::new(InMemoryMessageRepository::new());
        let service = MessageService::new(repo.clone());

        let result = service.append(String::new(), "u1".to_string(), None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.message_count(), 0);
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let service = MessageService::new(Arc::new(InMemoryMessageRepository::new()));
        for i in 0..5 {
            service
                .append(format!("m{i}"), "u1".to_string(), None)
                .await
                .unwrap();
        }

        let recent = service.recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = MessageService::new(Arc::new(FailingMessageRepository));

        let append = service.append("hi".to_string(), "u1".to_string(), None).await;
        let recent = service.recent(DEFAULT_MESSAGE_LIMIT).await;

        assert!(matches!(append, Err(AppError::DatabaseError(_))));
        assert!(matches!(recent, Err(AppError::DatabaseError(_))));
    }
}
