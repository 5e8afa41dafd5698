//! Connection manager
//!
//! Registry of every live connection, keyed by connection handle. Uses
//! `DashMap` so connection tasks never contend on a single lock.

use super::{Connection, ConnectionId, Outbound};
use dashmap::DashMap;
use dm_core::User;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all active WebSocket connections
pub struct ConnectionManager {
    connections: DashMap<ConnectionId, Arc<Connection>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection for an already resolved identity
    pub fn add_connection(&self, user: User, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let connection = Connection::new(user, sender);
        self.connections.insert(connection.id(), connection.clone());

        tracing::debug!(
            connection_id = %connection.id(),
            username = %connection.username(),
            "Connection added"
        );

        connection
    }

    /// Remove a connection; removing an unknown handle is a no-op
    pub fn remove_connection(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        let removed = self.connections.remove(&id).map(|(_, connection)| connection);
        if removed.is_some() {
            tracing::debug!(connection_id = %id, "Connection removed");
        }
        removed
    }

    /// Get a connection by handle
    pub fn get_connection(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(&id).map(|r| r.clone())
    }

    /// Snapshot of every live connection
    ///
    /// Collected up front so no map shard stays locked while callers send.
    pub fn all_connections(&self) -> Vec<Arc<Connection>> {
        self.connections.iter().map(|r| r.value().clone()).collect()
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .finish()
    }
}
