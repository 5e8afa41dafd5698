//! Handler error types

use crate::events::GatewayEvent;
use crate::protocol::CloseCode;
use dm_service::ServiceError;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload did not match the op code
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl HandlerError {
    /// Close code for errors that end the session
    ///
    /// `None` means only the single operation failed: the caller gets an
    /// `ERROR` event and the connection stays open.
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::Service(e) if e.is_auth_failure() => Some(CloseCode::AuthenticationFailed),
            Self::Service(e) if e.is_not_found() || e.is_transient() => None,
            Self::Service(_) => Some(CloseCode::UnknownError),
        }
    }

    /// `ERROR` event describing this failure to the caller
    pub fn to_error_event(&self) -> GatewayEvent {
        match self {
            Self::InvalidPayload(msg) => GatewayEvent::error("INVALID_PAYLOAD", msg.clone()),
            Self::Service(e) => GatewayEvent::error(e.error_code(), e.to_string()),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
