//! # dm-service
//!
//! Application layer: resolves identities, runs the message store use cases
//! (send, page with read marking), and builds per-viewer online snapshots.

pub mod services;

pub use services::{
    ConversationPage, IdentityService, MessageService, SentMessage, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, SnapshotService,
};
