//! Message service
//!
//! Sending direct messages and paging a conversation. Reading a page marks
//! the messages addressed to the viewer as read.

use dm_core::entities::{Message, User};
use dm_core::traits::ConversationQuery;
use dm_core::Snowflake;
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::identity::IdentityService;

/// A stored message together with both parties
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: Message,
    pub sender: User,
    pub receiver: User,
}

/// One page of a conversation, ascending by creation time
#[derive(Debug, Clone)]
pub struct ConversationPage {
    pub peer: User,
    pub page: u32,
    pub messages: Vec<Message>,
}

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a new unread message from `sender_username` to `receiver_id`
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn send(
        &self,
        sender_username: &str,
        receiver_id: Snowflake,
        content: String,
    ) -> ServiceResult<SentMessage> {
        let identity = IdentityService::new(self.ctx);
        let sender = identity.current_user(sender_username).await?;
        let receiver = identity.find_by_id(receiver_id).await?;

        let message = Message::new(self.ctx.generate_id(), sender.id, receiver.id, content);
        self.ctx.message_repo().create(&message).await?;

        info!(
            message_id = %message.id,
            sender_id = %sender.id,
            receiver_id = %receiver.id,
            "Message stored"
        );

        Ok(SentMessage {
            message,
            sender,
            receiver,
        })
    }

    /// Fetch a page of the conversation between the viewer and `peer_id`
    ///
    /// Page 1 holds the newest messages; anything below 1 is treated as 1.
    /// Messages in the page addressed to the viewer come back marked read.
    #[instrument(skip(self))]
    pub async fn page(
        &self,
        viewer_username: &str,
        peer_id: Snowflake,
        page_number: Option<i64>,
    ) -> ServiceResult<ConversationPage> {
        let identity = IdentityService::new(self.ctx);
        let viewer = identity.current_user(viewer_username).await?;
        let peer = identity.find_by_id(peer_id).await?;

        let query = ConversationQuery::new(
            viewer.id,
            peer.id,
            page_number.unwrap_or(1),
            self.ctx.page_size(),
        );
        let mut messages = self.ctx.message_repo().find_conversation_page(&query).await?;

        // Only flips that actually change anything are written
        let unread: Vec<Snowflake> = messages
            .iter()
            .filter(|m| m.is_addressed_to(viewer.id) && !m.is_read)
            .map(|m| m.id)
            .collect();

        if !unread.is_empty() {
            let changed = self.ctx.message_repo().mark_read(viewer.id, &unread).await?;
            debug!(viewer_id = %viewer.id, changed, "Marked page as read");
            for message in &mut messages {
                message.mark_read_by(viewer.id);
            }
        }

        Ok(ConversationPage {
            peer,
            page: query.page,
            messages,
        })
    }
}
