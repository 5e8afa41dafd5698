//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and are cheap to construct per call.

pub mod context;
pub mod error;
pub mod identity;
pub mod message;
pub mod snapshot;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use identity::IdentityService;
pub use message::{ConversationPage, MessageService, SentMessage};
pub use snapshot::SnapshotService;
