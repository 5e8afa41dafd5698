//! PostgreSQL implementation of MessageRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dm_core::entities::Message;
use dm_core::traits::{ConversationQuery, MessageRepository, RepoResult};
use dm_core::value_objects::Snowflake;

use crate::mappers::MessageInsert;
use crate::models::{MessageModel, UnreadCountRow};

use super::error::map_db_error;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let insert = MessageInsert::new(message);

        sqlx::query(
            r"
            INSERT INTO messages (id, sender_id, receiver_id, content, created_at, is_read)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(insert.id)
        .bind(insert.sender_id)
        .bind(insert.receiver_id)
        .bind(insert.content)
        .bind(insert.created_at)
        .bind(insert.is_read)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_conversation_page(&self, query: &ConversationQuery) -> RepoResult<Vec<Message>> {
        // Newest first for paging, flipped to chronological order below
        let results = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, sender_id, receiver_id, content, created_at, is_read
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at DESC, id DESC
            OFFSET $3
            LIMIT $4
            ",
        )
        .bind(query.viewer_id.into_inner())
        .bind(query.peer_id.into_inner())
        .bind(query.offset())
        .bind(query.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().rev().map(Message::from).collect())
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn mark_read(&self, receiver_id: Snowflake, message_ids: &[Snowflake]) -> RepoResult<u64> {
        if message_ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = message_ids.iter().copied().map(Snowflake::into_inner).collect();

        let result = sqlx::query(
            r"
            UPDATE messages
            SET is_read = TRUE
            WHERE receiver_id = $1 AND id = ANY($2) AND is_read = FALSE
            ",
        )
        .bind(receiver_id.into_inner())
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn unread_counts(&self, receiver_id: Snowflake) -> RepoResult<HashMap<Snowflake, i64>> {
        let rows = sqlx::query_as::<_, UnreadCountRow>(
            r"
            SELECT sender_id, COUNT(*) AS unread
            FROM messages
            WHERE receiver_id = $1 AND is_read = FALSE
            GROUP BY sender_id
            ",
        )
        .bind(receiver_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (Snowflake::new(row.sender_id), row.unread))
            .collect())
    }
}
