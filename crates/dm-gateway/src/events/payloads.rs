//! Event payload definitions
//!
//! Defines the data structures for each gateway event type.

use dm_core::{Message, OnlineUser, Snowflake, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GatewayEventType;

/// USER_JOINED event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedEvent {
    pub id: Snowflake,
    pub username: String,
    pub full_name: String,
    pub profile_image: Option<String>,
}

impl From<&User> for UserJoinedEvent {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

/// TYPING_START event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingStartEvent {
    /// Who is typing
    pub username: String,
}

/// ERROR event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}

/// An outbound dispatch event with its payload
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    MessageList(Vec<Message>),
    UserJoined(UserJoinedEvent),
    OnlineUsers(Vec<OnlineUser>),
    MessageCreate(Message),
    TypingStart(TypingStartEvent),
    Error(ErrorEvent),
}

impl GatewayEvent {
    #[must_use]
    pub fn user_joined(user: &User) -> Self {
        Self::UserJoined(UserJoinedEvent::from(user))
    }

    #[must_use]
    pub fn typing_start(username: impl Into<String>) -> Self {
        Self::TypingStart(TypingStartEvent {
            username: username.into(),
        })
    }

    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(ErrorEvent {
            code: code.into(),
            message: message.into(),
        })
    }

    #[must_use]
    pub const fn event_type(&self) -> GatewayEventType {
        match self {
            Self::MessageList(_) => GatewayEventType::MessageList,
            Self::UserJoined(_) => GatewayEventType::UserJoined,
            Self::OnlineUsers(_) => GatewayEventType::OnlineUsers,
            Self::MessageCreate(_) => GatewayEventType::MessageCreate,
            Self::TypingStart(_) => GatewayEventType::TypingStart,
            Self::Error(_) => GatewayEventType::Error,
        }
    }

    /// Encode the payload as the `d` field of a dispatch frame
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::MessageList(messages) => serde_json::to_value(messages),
            Self::UserJoined(event) => serde_json::to_value(event),
            Self::OnlineUsers(entries) => serde_json::to_value(entries),
            Self::MessageCreate(message) => serde_json::to_value(message),
            Self::TypingStart(event) => serde_json::to_value(event),
            Self::Error(event) => serde_json::to_value(event),
        }
    }
}
