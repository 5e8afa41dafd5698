//! In-memory implementation of UserRepository

use async_trait::async_trait;
use parking_lot::RwLock;

use dm_core::entities::User;
use dm_core::traits::{RepoResult, UserRepository};
use dm_core::value_objects::Snowflake;

/// Identity directory backed by a vector, ordered by id
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository seeded with `users`
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let repo = Self::new();
        for user in users {
            repo.insert(user);
        }
        repo
    }

    /// Add or replace a user, keyed by id
    pub fn insert(&self, user: User) {
        let mut users = self.users.write();
        match users.binary_search_by_key(&user.id, |u| u.id) {
            Ok(pos) => users[pos] = user,
            Err(pos) => users.insert(pos, user),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.users.read().clone())
    }
}
