use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::MessageModel;
use crate::shared::AppError;

/// Trait for message repository operations
#[async_trait]
pub trait MessageRepository {
    async fn insert_message(&self, message: &MessageModel) -> Result<(), AppError>;

    /// Newest messages first, at most `limit` of them
    async fn recent_messages(&self, limit: usize) -> Result<Vec<MessageModel>, AppError>;
}

/// In-memory implementation of MessageRepository for development and testing
///
/// Data is lost when the application restarts.
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<MessageModel>>,
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of stored messages
    pub fn message_count(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    #[instrument(skip(self, message))]
    async fn insert_message(&self, message: &MessageModel) -> Result<(), AppError> {
        debug!(message_id = %message.id, "Storing message in memory");

        let mut messages = self.messages.lock().map_err(|_| AppError::Internal)?;
        messages.push(message.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_messages(&self, limit: usize) -> Result<Vec<MessageModel>, AppError> {
        let messages = self.messages.lock().map_err(|_| AppError::Internal)?;

        // Latest insert first so the stable sort breaks timestamp ties by recency
        let mut recent: Vec<MessageModel> = messages.iter().rev().cloned().collect();
        drop(messages);

        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);

        debug!(count = recent.len(), "Messages fetched from memory");
        Ok(recent)
    }
}

/// SQLite implementation of message repository
pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url` and
    /// ensures the schema exists
    #[instrument]
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                warn!(error = %e, "Invalid database url");
                AppError::DatabaseError(e.to_string())
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to open message database");
                AppError::DatabaseError(e.to_string())
            })?;

        let repository = Self::new(pool);
        repository.migrate().await?;

        info!("Message database ready");
        Ok(repository)
    }

    /// Creates the messages table and its creation-time index
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                text TEXT NOT NULL,
                signature TEXT NOT NULL DEFAULT '',
                author_id TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create messages table");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages (created_at)")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create messages index");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    /// Closes the pool, flushing outstanding connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    #[instrument(skip(self, message))]
    async fn insert_message(&self, message: &MessageModel) -> Result<(), AppError> {
        debug!(message_id = %message.id, "Inserting message into database");

        sqlx::query(
            "INSERT INTO messages (id, text, signature, author_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.text)
        .bind(&message.signature)
        .bind(&message.author_id)
        .bind(message.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, message_id = %message.id, "Failed to insert message into database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_messages(&self, limit: usize) -> Result<Vec<MessageModel>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            "SELECT id, text, signature, author_id, created_at FROM messages
             ORDER BY created_at DESC, seq DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch messages from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let messages = rows
            .into_iter()
            .map(|row| {
                let created_at_ms: i64 = row.get("created_at");
                let created_at = DateTime::from_timestamp_millis(created_at_ms).ok_or_else(|| {
                    AppError::DatabaseError(format!("Invalid created_at: {created_at_ms}"))
                })?;

                Ok(MessageModel {
                    id: row.get("id"),
                    text: row.get("text"),
                    signature: row.get("signature"),
                    author_id: row.get("author_id"),
                    created_at,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        debug!(count = messages.len(), "Messages fetched from database");
        Ok(messages)
    }
}
