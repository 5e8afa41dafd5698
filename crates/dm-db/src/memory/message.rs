//! In-memory implementation of MessageRepository

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use dm_core::entities::Message;
use dm_core::error::DomainError;
use dm_core::traits::{ConversationQuery, MessageRepository, RepoResult};
use dm_core::value_objects::Snowflake;

/// Message store backed by a vector in insertion order
#[derive(Debug, Default)]
pub struct MemoryMessageRepository {
    messages: RwLock<Vec<Message>>,
}

impl MemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let mut messages = self.messages.write();
        if messages.iter().any(|m| m.id == message.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate message id {}",
                message.id
            )));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn find_conversation_page(&self, query: &ConversationQuery) -> RepoResult<Vec<Message>> {
        let mut conversation: Vec<Message> = self
            .messages
            .read()
            .iter()
            .filter(|m| m.is_between(query.viewer_id, query.peer_id))
            .cloned()
            .collect();

        // Newest first, then take the requested window
        conversation.sort_by_key(|m| std::cmp::Reverse(m.history_key()));

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);

        let mut page: Vec<Message> = conversation.into_iter().skip(offset).take(limit).collect();
        page.reverse();
        Ok(page)
    }

    async fn mark_read(&self, receiver_id: Snowflake, message_ids: &[Snowflake]) -> RepoResult<u64> {
        let mut changed = 0;
        for message in self.messages.write().iter_mut() {
            if message_ids.contains(&message.id) && message.mark_read_by(receiver_id) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn unread_counts(&self, receiver_id: Snowflake) -> RepoResult<HashMap<Snowflake, i64>> {
        let mut counts = HashMap::new();
        for message in self.messages.read().iter() {
            if message.is_addressed_to(receiver_id) && !message.is_read {
                *counts.entry(message.sender_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    const ALICE: Snowflake = Snowflake::new(1);
    const BOB: Snowflake = Snowflake::new(2);
    const CAROL: Snowflake = Snowflake::new(3);

    fn message(id: i64, from: Snowflake, to: Snowflake, seconds_ago: i64) -> Message {
        let mut m = Message::new(Snowflake::new(id), from, to, format!("m{id}"));
        m.created_at = Utc::now() - Duration::seconds(seconds_ago);
        m
    }

    async fn seeded() -> MemoryMessageRepository {
        let repo = MemoryMessageRepository::new();
        for i in 0..25 {
            let (from, to) = if i % 2 == 0 { (ALICE, BOB) } else { (BOB, ALICE) };
            repo.create(&message(100 + i, from, to, 1000 - i)).await.unwrap();
        }
        repo.create(&message(500, CAROL, ALICE, 1)).await.unwrap();
        repo
    }

    fn ids(page: &[Message]) -> Vec<i64> {
        page.iter().map(|m| m.id.into_inner()).collect()
    }

    #[tokio::test]
    async fn test_first_page_is_newest_in_ascending_order() {
        let repo = seeded().await;
        let page = repo
            .find_conversation_page(&ConversationQuery::new(ALICE, BOB, 1, 10))
            .await
            .unwrap();

        assert_eq!(ids(&page), (115..125).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_later_pages_walk_backwards() {
        let repo = seeded().await;
        let page2 = repo
            .find_conversation_page(&ConversationQuery::new(BOB, ALICE, 2, 10))
            .await
            .unwrap();
        let page3 = repo
            .find_conversation_page(&ConversationQuery::new(BOB, ALICE, 3, 10))
            .await
            .unwrap();
        let page4 = repo
            .find_conversation_page(&ConversationQuery::new(BOB, ALICE, 4, 10))
            .await
            .unwrap();

        assert_eq!(ids(&page2), (105..115).collect::<Vec<_>>());
        assert_eq!(ids(&page3), (100..105).collect::<Vec<_>>());
        assert!(page4.is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_break_ties_by_id() {
        let repo = MemoryMessageRepository::new();
        let now = Utc::now();
        for id in [3, 1, 2] {
            let mut m = message(id, ALICE, BOB, 0);
            m.created_at = now;
            repo.create(&m).await.unwrap();
        }

        let page = repo
            .find_conversation_page(&ConversationQuery::new(ALICE, BOB, 1, 10))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_mark_read_only_flips_messages_to_receiver() {
        let repo = seeded().await;
        let all: Vec<Snowflake> = (100..125).map(Snowflake::new).collect();

        // Bob received the 13 even-indexed messages
        assert_eq!(repo.mark_read(BOB, &all).await.unwrap(), 13);
        assert_eq!(repo.mark_read(BOB, &all).await.unwrap(), 0);

        assert!(repo.unread_counts(BOB).await.unwrap().is_empty());
        let alice_unread = repo.unread_counts(ALICE).await.unwrap();
        assert_eq!(alice_unread.get(&BOB), Some(&12));
        assert_eq!(alice_unread.get(&CAROL), Some(&1));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let repo = MemoryMessageRepository::new();
        repo.create(&message(1, ALICE, BOB, 0)).await.unwrap();
        let err = repo.create(&message(1, ALICE, BOB, 0)).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(repo.len(), 1);
    }
}
