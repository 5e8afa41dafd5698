//! SendMessage handler (op 2)

use super::HandlerResult;
use crate::connection::Connection;
use crate::events::GatewayEvent;
use crate::protocol::{CloseCode, SendMessagePayload};
use crate::server::GatewayState;
use dm_service::MessageService;

/// Stores a direct message and delivers it to the receiver
pub struct MessageHandler;

impl MessageHandler {
    /// Handle a SendMessage message
    ///
    /// The message is stored even when the receiver is offline; it is then
    /// only visible through history.
    pub async fn handle(
        state: &GatewayState,
        connection: &Connection,
        payload: SendMessagePayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let sent = MessageService::new(state.service_context())
            .send(connection.username(), payload.receiver_id, payload.content)
            .await?;

        let delivered = state.dispatcher().send_to_user(
            &sent.receiver.username,
            &GatewayEvent::MessageCreate(sent.message),
        );

        tracing::debug!(
            connection_id = %connection.id(),
            receiver = %sent.receiver.username,
            delivered,
            "Message sent"
        );

        Ok(None)
    }
}
