//! Online snapshot entry - derived per viewer, never persisted

use serde::{Deserialize, Serialize};

use super::User;
use crate::value_objects::Snowflake;

/// One row of the online snapshot as seen by a particular viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    pub id: Snowflake,
    pub username: String,
    pub full_name: String,
    pub profile_image: Option<String>,
    pub is_online: bool,
    /// Unread messages from this user to the viewer
    pub unread_count: i64,
}

impl OnlineUser {
    pub fn new(user: User, is_online: bool, unread_count: i64) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            profile_image: user.profile_image,
            is_online,
            unread_count,
        }
    }

    /// Stable sort putting online users first, keeping the input order otherwise
    pub fn sort_online_first(entries: &mut [OnlineUser]) {
        entries.sort_by_key(|entry| !entry.is_online);
    }
}
