//! Client payloads
//!
//! The `d` field of each client op code. Ids may be sent as strings or numbers.

use dm_core::Snowflake;
use serde::{Deserialize, Serialize};

/// RequestHistory payload (op 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHistoryPayload {
    /// The other party of the conversation
    pub user_id: Snowflake,
    /// 1-based, newest page first; defaults to 1
    #[serde(default)]
    pub page_number: Option<i64>,
}

/// SendMessage payload (op 2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub receiver_id: Snowflake,
    pub content: String,
}

/// NotifyTyping payload (op 3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyTypingPayload {
    pub receiver_username: String,
}
