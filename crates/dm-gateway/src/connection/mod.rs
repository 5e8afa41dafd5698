//! Connection management
//!
//! Tracks live WebSocket connections and owns their outbound queues.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionId, ConnectionState, DeliveryError, Outbound};
pub use manager::ConnectionManager;
