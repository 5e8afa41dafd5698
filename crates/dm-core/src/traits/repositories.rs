//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{Message, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Default number of messages in one history page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ============================================================================
// User Repository
// ============================================================================

/// Read side of the identity collaborator
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// List every known identity
    async fn list_all(&self) -> RepoResult<Vec<User>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// One page of the conversation between a viewer and a peer
///
/// Pages are counted from the newest message backwards: page 1 holds the
/// `page_size` most recent messages, page 2 the ones before that, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationQuery {
    pub viewer_id: Snowflake,
    pub peer_id: Snowflake,
    pub page: u32,
    pub page_size: u32,
}

impl ConversationQuery {
    /// Build a query, clamping `page` and `page_size` to at least 1
    pub fn new(viewer_id: Snowflake, peer_id: Snowflake, page: i64, page_size: u32) -> Self {
        Self {
            viewer_id,
            peer_id,
            page: u32::try_from(page.max(1)).unwrap_or(u32::MAX),
            page_size: page_size.max(1),
        }
    }

    /// Number of newest messages to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Fetch one page of a conversation, returned in ascending `(created_at, id)` order
    async fn find_conversation_page(&self, query: &ConversationQuery) -> RepoResult<Vec<Message>>;

    /// Flip `is_read` for the given messages addressed to `receiver_id`
    ///
    /// Messages not addressed to the receiver or already read are left alone.
    /// Returns the number of messages that changed.
    async fn mark_read(&self, receiver_id: Snowflake, message_ids: &[Snowflake]) -> RepoResult<u64>;

    /// Unread message counts addressed to `receiver_id`, keyed by sender
    async fn unread_counts(&self, receiver_id: Snowflake) -> RepoResult<HashMap<Snowflake, i64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_clamps_page() {
        let q = ConversationQuery::new(Snowflake::new(1), Snowflake::new(2), 0, 10);
        assert_eq!(q.page, 1);
        assert_eq!(q.offset(), 0);

        let q = ConversationQuery::new(Snowflake::new(1), Snowflake::new(2), -4, 10);
        assert_eq!(q.page, 1);
    }

    #[test]
    fn test_query_offset() {
        let q = ConversationQuery::new(Snowflake::new(1), Snowflake::new(2), 3, 10);
        assert_eq!(q.offset(), 20);
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn test_query_page_size_never_zero() {
        let q = ConversationQuery::new(Snowflake::new(1), Snowflake::new(2), 1, 0);
        assert_eq!(q.page_size, 1);
    }
}
