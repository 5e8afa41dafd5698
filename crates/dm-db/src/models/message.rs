//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Aggregate row: unread messages from one sender
#[derive(Debug, Clone, FromRow)]
pub struct UnreadCountRow {
    pub sender_id: i64,
    pub unread: i64,
}
