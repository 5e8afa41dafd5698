//! Repository traits (ports)

mod repositories;

pub use repositories::{
    ConversationQuery, MessageRepository, RepoResult, UserRepository, DEFAULT_PAGE_SIZE,
};
