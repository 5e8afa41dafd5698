//! Presence directory
//!
//! Which identities are online, and through which connection.

mod directory;
mod record;

pub use directory::{PresenceDirectory, PresenceTransition};
pub use record::PresenceRecord;
