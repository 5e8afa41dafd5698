//! NotifyTyping handler (op 3)

use super::HandlerResult;
use crate::connection::Connection;
use crate::events::GatewayEvent;
use crate::protocol::{CloseCode, NotifyTypingPayload};
use crate::server::GatewayState;

/// Relays an ephemeral typing signal to the receiver's live connection
pub struct TypingHandler;

impl TypingHandler {
    /// Handle a NotifyTyping message
    ///
    /// An offline receiver makes this a no-op. Nothing is stored.
    pub fn handle(
        state: &GatewayState,
        connection: &Connection,
        payload: &NotifyTypingPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let delivered = state.dispatcher().send_to_user(
            &payload.receiver_username,
            &GatewayEvent::typing_start(connection.username()),
        );

        tracing::trace!(
            connection_id = %connection.id(),
            receiver = %payload.receiver_username,
            delivered,
            "Typing relayed"
        );

        Ok(None)
    }
}
