//! Op code handlers
//!
//! Handles incoming WebSocket messages based on their operation code, plus
//! the connect and disconnect transitions.

mod error;
mod history;
mod lifecycle;
mod message;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use history::HistoryHandler;
pub use lifecycle::LifecycleManager;
pub use message::MessageHandler;
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    ///
    /// Frames from one connection are handled one at a time, in arrival order.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Connection,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        // Validate that this is a client-sendable op code
        if !message.op.is_client_op() {
            tracing::warn!(
                connection_id = %connection.id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::RequestHistory => {
                let payload = message.payload().map_err(|e| {
                    HandlerError::InvalidPayload(format!("Invalid RequestHistory payload: {e}"))
                })?;

                HistoryHandler::handle(state, connection, payload).await
            }
            OpCode::SendMessage => {
                let payload = message.payload().map_err(|e| {
                    HandlerError::InvalidPayload(format!("Invalid SendMessage payload: {e}"))
                })?;

                MessageHandler::handle(state, connection, payload).await
            }
            OpCode::NotifyTyping => {
                let payload = message.payload().map_err(|e| {
                    HandlerError::InvalidPayload(format!("Invalid NotifyTyping payload: {e}"))
                })?;

                TypingHandler::handle(state, connection, &payload)
            }
            // Rejected above by the is_client_op check
            OpCode::Dispatch => Ok(Some(CloseCode::UnknownOpcode)),
        }
    }
}
