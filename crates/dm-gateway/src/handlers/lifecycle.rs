//! Connection lifecycle
//!
//! Connecting -> Active -> Disconnected. Identity is resolved before the
//! upgrade, so a connection reaching this module always has a user.

use super::history::HistoryHandler;
use super::HandlerError;
use crate::connection::{Connection, ConnectionState};
use crate::events::GatewayEvent;
use crate::presence::{PresenceRecord, PresenceTransition};
use crate::server::GatewayState;
use dm_core::Snowflake;
use dm_service::SnapshotService;
use std::collections::HashMap;
use std::sync::Arc;

/// Runs the connect and disconnect transitions
pub struct LifecycleManager;

impl LifecycleManager {
    /// Connecting -> Active
    ///
    /// Registers presence, announces a new presence to everyone else, replays
    /// the conversation with `peer` when one was requested, then refreshes
    /// every client's online list.
    pub async fn on_connect(
        state: &GatewayState,
        connection: &Connection,
        peer: Option<&str>,
    ) -> PresenceTransition {
        let record = PresenceRecord::new(connection.user(), connection.id());
        let transition = state.presence().upsert(record);
        connection.set_state(ConnectionState::Active);

        match transition {
            PresenceTransition::NewPresence => {
                tracing::info!(
                    connection_id = %connection.id(),
                    username = %connection.username(),
                    "User came online"
                );
                state
                    .dispatcher()
                    .broadcast_except(connection.id(), &GatewayEvent::user_joined(connection.user()));
            }
            PresenceTransition::Reconnection { previous } => {
                tracing::info!(
                    connection_id = %connection.id(),
                    previous = %previous,
                    username = %connection.username(),
                    "User reconnected"
                );
            }
        }

        if let Some(peer) = peer {
            Self::replay_on_connect(state, connection, peer).await;
        }

        Self::broadcast_online_snapshot(state).await;
        transition
    }

    /// Active -> Disconnected
    ///
    /// Removing a presence that is already gone is a no-op; the snapshot is
    /// broadcast either way.
    pub async fn on_disconnect(state: &GatewayState, connection: &Connection) {
        connection.set_state(ConnectionState::Disconnected);

        if let Some(record) = state.presence().remove(connection.username()) {
            tracing::info!(
                connection_id = %connection.id(),
                user_id = %record.user_id,
                username = %record.username,
                "User went offline"
            );
        } else {
            tracing::debug!(
                connection_id = %connection.id(),
                username = %connection.username(),
                "Presence already removed"
            );
        }

        Self::broadcast_online_snapshot(state).await;
    }

    async fn replay_on_connect(state: &GatewayState, connection: &Connection, peer: &str) {
        let result = match Snowflake::parse(peer) {
            Ok(peer_id) => HistoryHandler::replay(state, connection, peer_id, None).await,
            Err(_) => Err(HandlerError::InvalidPayload(format!("Invalid userId: {peer}"))),
        };

        if let Err(e) = result {
            tracing::warn!(
                connection_id = %connection.id(),
                error = %e,
                "History replay on connect failed"
            );
            state
                .dispatcher()
                .send_to_connection(connection, &e.to_error_event());
        }
    }

    /// Send every active connection its own online snapshot
    ///
    /// Unread counts depend on the viewer, so one snapshot is built per
    /// distinct identity. A viewer whose snapshot cannot be built gets an
    /// `ERROR` event instead. Returns the number of snapshots delivered.
    pub async fn broadcast_online_snapshot(state: &GatewayState) -> usize {
        let online = state.presence().snapshot_keys();

        let mut viewers: HashMap<Snowflake, Vec<Arc<Connection>>> = HashMap::new();
        for connection in state.connection_manager().all_connections() {
            if connection.is_active() {
                viewers.entry(connection.user_id()).or_default().push(connection);
            }
        }

        let snapshots = SnapshotService::new(state.service_context());
        let mut sent = 0;

        for (viewer_id, connections) in viewers {
            let event = match snapshots.online_snapshot(viewer_id, &online).await {
                Ok(entries) => GatewayEvent::OnlineUsers(entries),
                Err(e) => {
                    tracing::warn!(viewer_id = %viewer_id, error = %e, "Failed to build online snapshot");
                    let error = HandlerError::from(e).to_error_event();
                    for conn in &connections {
                        state.dispatcher().send_to_connection(conn, &error);
                    }
                    continue;
                }
            };

            sent += connections
                .iter()
                .filter(|conn| state.dispatcher().send_to_connection(conn, &event))
                .count();
        }

        tracing::debug!(online = online.len(), sent, "Online snapshot broadcast");
        sent
    }
}
