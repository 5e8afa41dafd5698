//! Database models
//!
//! Row types read straight from PostgreSQL with `FromRow`.

mod message;
mod user;

pub use message::{MessageModel, UnreadCountRow};
pub use user::UserModel;
