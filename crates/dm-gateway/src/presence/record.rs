//! Presence record

use crate::connection::ConnectionId;
use dm_core::{Snowflake, User};

/// One online identity and the connection it was last seen on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    pub user_id: Snowflake,
    pub username: String,
    pub full_name: String,
    pub profile_image: Option<String>,
    pub connection_id: ConnectionId,
}

impl PresenceRecord {
    #[must_use]
    pub fn new(user: &User, connection_id: ConnectionId) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            profile_image: user.profile_image.clone(),
            connection_id,
        }
    }
}
