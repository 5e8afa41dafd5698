//! In-memory repositories
//!
//! Same semantics as the PostgreSQL repositories, held in process memory.
//! Used by tests and by local runs without a database.

mod message;
mod user;

pub use message::MemoryMessageRepository;
pub use user::MemoryUserRepository;
