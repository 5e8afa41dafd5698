//! Message entity - one direct message between two users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Direct message
///
/// Created on send and only ever mutated to flip `is_read` from false to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    /// Create a new unread Message stamped with the mint time of its id
    pub fn new(
        id: Snowflake,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            sender_id,
            receiver_id,
            content: content.into(),
            created_at: id.created_at(),
            is_read: false,
        }
    }

    /// Check whether this message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: Snowflake, b: Snowflake) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    #[inline]
    pub fn is_addressed_to(&self, user_id: Snowflake) -> bool {
        self.receiver_id == user_id
    }

    /// Mark as read on behalf of `viewer`
    ///
    /// Only the receiver can read a message. Returns true when the flag flipped.
    pub fn mark_read_by(&mut self, viewer: Snowflake) -> bool {
        if self.is_addressed_to(viewer) && !self.is_read {
            self.is_read = true;
            true
        } else {
            false
        }
    }

    /// Ordering key for conversation history: creation time, then id
    #[inline]
    pub fn history_key(&self) -> (DateTime<Utc>, Snowflake) {
        (self.created_at, self.id)
    }
}
