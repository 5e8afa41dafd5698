//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection, the identity behind it and its
//! outbound queue.

use crate::events::GatewayEventType;
use crate::protocol::{CloseCode, GatewayMessage};
use dm_core::{Snowflake, User};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque handle for one live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection state
///
/// `Disconnected` is terminal; a reconnect is a brand-new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Identity resolved, lifecycle hooks not yet run
    Connecting,
    /// Registered in the presence directory
    Active,
    /// Connection is closed
    Disconnected,
}

/// Item on a connection's outbound queue
#[derive(Debug, Clone)]
pub enum Outbound {
    Message(GatewayMessage),
    /// Send a close frame and stop writing
    Close(CloseCode),
}

/// Why an outbound item was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("outbound queue is full")]
    Full,

    #[error("connection is closed")]
    Closed,
}

impl<T> From<mpsc::error::TrySendError<T>> for DeliveryError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => Self::Full,
            mpsc::error::TrySendError::Closed(_) => Self::Closed,
        }
    }
}

/// A single WebSocket connection
pub struct Connection {
    /// Unique connection handle
    id: ConnectionId,

    /// Identity resolved before the upgrade
    user: User,

    /// Current connection state
    state: RwLock<ConnectionState>,

    /// Channel to the socket writer task
    sender: mpsc::Sender<Outbound>,

    /// Last sequence number sent
    sequence: AtomicU64,
}

impl Connection {
    /// Create a new connection in the `Connecting` state
    pub fn new(user: User, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(),
            user,
            state: RwLock::new(ConnectionState::Connecting),
            sender,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> Snowflake {
        self.user.id
    }

    /// Presence key of this connection
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Get the current state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Set the connection state
    ///
    /// Once `Disconnected`, the state never changes again.
    pub fn set_state(&self, state: ConnectionState) {
        let mut current = self.state.write();
        if *current != ConnectionState::Disconnected {
            *current = state;
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == ConnectionState::Active
    }

    /// Get the next sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Get the current sequence number
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Queue a dispatch event without waiting
    ///
    /// The sequence number is only consumed when the frame is queued.
    pub fn dispatch(&self, event_type: GatewayEventType, data: Value) -> Result<(), DeliveryError> {
        let permit = self.sender.try_reserve()?;
        let message = GatewayMessage::dispatch(event_type.as_str(), self.next_sequence(), data);
        permit.send(Outbound::Message(message));
        Ok(())
    }

    /// Queue a close frame; the writer stops after sending it
    pub fn close(&self, code: CloseCode) -> Result<(), DeliveryError> {
        self.sender.try_send(Outbound::Close(code))?;
        Ok(())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("username", &self.user.username)
            .field("state", &self.state())
            .field("sequence", &self.current_sequence())
            .finish()
    }
}
