//! Gateway message format
//!
//! Defines the structure for all WebSocket frames.

use super::{CloseCode, NotifyTypingPayload, OpCode, RequestHistoryPayload, SendMessagePayload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway message format
///
/// All frames sent over the WebSocket connection follow this format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

/// Why an inbound frame could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown op code: {0}")]
    UnknownOpcode(u8),
}

impl FrameError {
    /// Close code the connection ends with
    #[must_use]
    pub const fn close_code(&self) -> CloseCode {
        match self {
            Self::Malformed(_) => CloseCode::DecodeError,
            Self::UnknownOpcode(_) => CloseCode::UnknownOpcode,
        }
    }
}

/// Frame as it arrives, before the op code is checked
#[derive(Deserialize)]
struct RawFrame {
    op: u8,
    #[serde(default)]
    d: Option<Value>,
}

impl GatewayMessage {
    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    /// Create a client frame carrying `payload`
    pub fn client<T: Serialize>(op: OpCode, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op,
            t: None,
            s: None,
            d: Some(serde_json::to_value(payload)?),
        })
    }

    // === Parsing Client Messages ===

    /// Decode the payload as `T`; a missing `d` decodes from `null`
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.d.clone().unwrap_or(Value::Null))
    }

    /// Try to parse as a RequestHistory payload (op=1)
    pub fn as_request_history(&self) -> Option<RequestHistoryPayload> {
        if self.op != OpCode::RequestHistory {
            return None;
        }
        self.payload().ok()
    }

    /// Try to parse as a SendMessage payload (op=2)
    pub fn as_send_message(&self) -> Option<SendMessagePayload> {
        if self.op != OpCode::SendMessage {
            return None;
        }
        self.payload().ok()
    }

    /// Try to parse as a NotifyTyping payload (op=3)
    pub fn as_notify_typing(&self) -> Option<NotifyTypingPayload> {
        if self.op != OpCode::NotifyTyping {
            return None;
        }
        self.payload().ok()
    }

    // === Utilities ===

    /// Check if this is a valid client message
    #[must_use]
    pub fn is_valid_client_message(&self) -> bool {
        self.op.is_client_op()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an inbound frame
    ///
    /// Malformed JSON and unknown op codes are reported separately so the
    /// connection can be closed with the matching code.
    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        let raw: RawFrame = serde_json::from_str(json)?;
        let op = OpCode::from_u8(raw.op).ok_or(FrameError::UnknownOpcode(raw.op))?;
        Ok(Self {
            op,
            t: None,
            s: None,
            d: raw.d,
        })
    }

    /// Create an error close frame
    #[must_use]
    pub fn close_frame(code: CloseCode) -> (u16, String) {
        (code.as_u16(), code.reason().to_string())
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}
