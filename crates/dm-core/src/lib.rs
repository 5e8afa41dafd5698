//! # dm-core
//!
//! Domain layer for the direct-messaging hub: identities, messages, the online
//! snapshot projection, and the repository traits the storage layer implements.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Message, OnlineUser, User};
pub use error::DomainError;
pub use traits::{
    ConversationQuery, MessageRepository, RepoResult, UserRepository, DEFAULT_PAGE_SIZE,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
