//! User identity - owned by the identity collaborator, read-only for the hub

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// An authenticated user identity
///
/// `id` owns messages; `username` keys presence. Both are stable for the
/// lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub full_name: String,
    pub profile_image: Option<String>,
}

impl User {
    /// Create a new User without a profile image
    pub fn new(id: Snowflake, username: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            full_name: full_name.into(),
            profile_image: None,
        }
    }

    /// Attach a profile image reference
    pub fn with_profile_image(mut self, image: impl Into<String>) -> Self {
        self.profile_image = Some(image.into());
        self
    }

    /// Name to show in client lists, falling back to the username
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}
