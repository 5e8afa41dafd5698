//! RequestHistory handler (op 1) and history replay

use super::HandlerResult;
use crate::connection::Connection;
use crate::events::GatewayEvent;
use crate::protocol::{CloseCode, RequestHistoryPayload};
use crate::server::GatewayState;
use dm_core::Snowflake;
use dm_service::MessageService;

/// Loads a conversation page and delivers it to the viewer only
pub struct HistoryHandler;

impl HistoryHandler {
    /// Handle a RequestHistory message
    pub async fn handle(
        state: &GatewayState,
        connection: &Connection,
        payload: RequestHistoryPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        Self::replay(state, connection, payload.user_id, payload.page_number).await?;
        Ok(None)
    }

    /// Page the conversation with `peer_id`, mark it read, and send it as one `MESSAGE_LIST`
    ///
    /// An empty page is still delivered.
    pub async fn replay(
        state: &GatewayState,
        connection: &Connection,
        peer_id: Snowflake,
        page_number: Option<i64>,
    ) -> HandlerResult<()> {
        let page = MessageService::new(state.service_context())
            .page(connection.username(), peer_id, page_number)
            .await?;

        tracing::debug!(
            connection_id = %connection.id(),
            peer_id = %peer_id,
            page = page.page,
            count = page.messages.len(),
            "History page loaded"
        );

        state
            .dispatcher()
            .send_to_connection(connection, &GatewayEvent::MessageList(page.messages));
        Ok(())
    }
}
