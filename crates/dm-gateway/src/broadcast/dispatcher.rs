//! Delivery dispatcher
//!
//! Routes an event to one user, to everyone but one connection, or to
//! everyone. Delivery is fire-and-forget: an offline user or a full queue
//! drops the event for that recipient and never blocks the others.

use crate::connection::{Connection, ConnectionId, ConnectionManager, DeliveryError};
use crate::events::{GatewayEvent, GatewayEventType};
use crate::presence::PresenceDirectory;
use serde_json::Value;
use std::sync::Arc;

/// Delivers dispatch events to live connections
#[derive(Debug, Clone)]
pub struct DeliveryDispatcher {
    connections: Arc<ConnectionManager>,
    presence: Arc<PresenceDirectory>,
}

impl DeliveryDispatcher {
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager>, presence: Arc<PresenceDirectory>) -> Self {
        Self {
            connections,
            presence,
        }
    }

    /// Deliver to one specific connection
    pub fn send_to_connection(&self, connection: &Connection, event: &GatewayEvent) -> bool {
        encode(event).is_some_and(|(event_type, data)| deliver(connection, event_type, data))
    }

    /// Deliver to the live connection registered for `username`, if any
    ///
    /// Returns false when the user is offline.
    pub fn send_to_user(&self, username: &str, event: &GatewayEvent) -> bool {
        let Some(connection) = self
            .presence
            .find_by_username(username)
            .and_then(|id| self.connections.get_connection(id))
        else {
            tracing::trace!(username = %username, event = %event.event_type(), "Recipient offline, dropped");
            return false;
        };

        self.send_to_connection(&connection, event)
    }

    /// Deliver to every connection except `exclude`
    pub fn broadcast_except(&self, exclude: ConnectionId, event: &GatewayEvent) -> usize {
        self.fan_out(event, Some(exclude))
    }

    /// Deliver to every connection
    pub fn broadcast(&self, event: &GatewayEvent) -> usize {
        self.fan_out(event, None)
    }

    fn fan_out(&self, event: &GatewayEvent, exclude: Option<ConnectionId>) -> usize {
        let Some((event_type, data)) = encode(event) else {
            return 0;
        };

        let sent = self
            .connections
            .all_connections()
            .iter()
            .filter(|conn| Some(conn.id()) != exclude)
            .filter(|conn| deliver(conn, event_type, data.clone()))
            .count();

        tracing::debug!(event = %event_type, sent, "Event broadcast");
        sent
    }
}

fn encode(event: &GatewayEvent) -> Option<(GatewayEventType, Value)> {
    match event.to_value() {
        Ok(data) => Some((event.event_type(), data)),
        Err(e) => {
            tracing::error!(event = %event.event_type(), error = %e, "Failed to encode event");
            None
        }
    }
}

fn deliver(connection: &Connection, event_type: GatewayEventType, data: Value) -> bool {
    match connection.dispatch(event_type, data) {
        Ok(()) => true,
        Err(DeliveryError::Full) => {
            tracing::warn!(
                connection_id = %connection.id(),
                event = %event_type,
                "Outbound queue full, event dropped"
            );
            false
        }
        Err(DeliveryError::Closed) => {
            tracing::debug!(
                connection_id = %connection.id(),
                event = %event_type,
                "Connection closed, event dropped"
            );
            false
        }
    }
}
