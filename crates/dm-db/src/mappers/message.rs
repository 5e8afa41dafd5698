//! Message entity <-> model mapper

use chrono::{DateTime, Utc};
use dm_core::entities::Message;
use dm_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            content: model.content,
            created_at: model.created_at,
            is_read: model.is_read,
        }
    }
}

/// Message values bound into an INSERT
pub struct MessageInsert<'a> {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            receiver_id: message.receiver_id.into_inner(),
            content: &message.content,
            created_at: message.created_at,
            is_read: message.is_read,
        }
    }
}
