//! Gateway event types
//!
//! Defines all event type names for dispatch messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
///
/// These are the event names sent in the `t` field of dispatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    /// A page of conversation history, to the viewer only
    MessageList,
    /// A new identity came online, to everyone but that identity
    UserJoined,
    /// Online snapshot, to every connection
    OnlineUsers,
    /// New direct message, to the receiver only
    MessageCreate,
    /// Peer is typing, to the receiver only
    TypingStart,
    /// A single operation failed, to the caller only
    Error,
}

impl GatewayEventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessageList => "MESSAGE_LIST",
            Self::UserJoined => "USER_JOINED",
            Self::OnlineUsers => "ONLINE_USERS",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::TypingStart => "TYPING_START",
            Self::Error => "ERROR",
        }
    }

    /// Parse an event type from a string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MESSAGE_LIST" => Some(Self::MessageList),
            "USER_JOINED" => Some(Self::UserJoined),
            "ONLINE_USERS" => Some(Self::OnlineUsers),
            "MESSAGE_CREATE" => Some(Self::MessageCreate),
            "TYPING_START" => Some(Self::TypingStart),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
