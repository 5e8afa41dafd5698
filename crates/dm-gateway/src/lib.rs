//! # dm-gateway
//!
//! WebSocket hub for direct messaging: presence, connection lifecycle,
//! event delivery, history replay and typing relay.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod presence;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, run_server, GatewayState, GATEWAY_PATH};

#[cfg(test)]
pub(crate) mod testing {
    //! Gateway state over in-memory stores for handler tests

    use std::sync::Arc;

    use dm_common::{AppConfig, JwtService};
    use dm_core::{MessageRepository, Snowflake, SnowflakeGenerator, User};
    use dm_db::{MemoryMessageRepository, MemoryUserRepository};
    use dm_service::{MessageService, ServiceContext};
    use tokio::sync::mpsc;

    use crate::connection::{Connection, ConnectionState, Outbound};
    use crate::presence::PresenceRecord;
    use crate::protocol::GatewayMessage;
    use crate::server::GatewayState;

    pub fn alice() -> User {
        User::new(Snowflake::new(1), "alice", "Alice Liddell")
    }

    pub fn bob() -> User {
        User::new(Snowflake::new(2), "bob", "Bob Builder")
    }

    pub fn dave() -> User {
        User::new(Snowflake::new(3), "dave", "Dave Bowman").with_profile_image("dave.png")
    }

    pub struct TestState {
        pub state: GatewayState,
        pub messages: Arc<MemoryMessageRepository>,
    }

    impl TestState {
        pub fn new() -> Self {
            let messages = Arc::new(MemoryMessageRepository::new());
            Self::with_store(messages.clone(), messages)
        }

        /// Services read and write through `store`; `messages` stays the
        /// in-memory view tests inspect
        pub fn with_store(
            messages: Arc<MemoryMessageRepository>,
            store: Arc<dyn MessageRepository>,
        ) -> Self {
            let users = Arc::new(MemoryUserRepository::with_users([alice(), bob(), dave()]));
            let ctx = ServiceContext::new(
                users,
                store,
                Arc::new(JwtService::new("gateway-test-secret", 3600)),
                Arc::new(SnowflakeGenerator::new(1)),
                10,
            );
            let config = AppConfig::new(0, "postgres://unused", "gateway-test-secret");
            Self {
                state: GatewayState::new(ctx, config),
                messages,
            }
        }

        /// Add a connection without running the lifecycle
        pub fn register(&self, user: User) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
            let (tx, rx) = mpsc::channel(32);
            let conn = self.state.connection_manager().add_connection(user, tx);
            (conn, rx)
        }

        /// Add a connection that is present and active, with no events sent
        pub fn connect(&self, user: User) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
            let (conn, rx) = self.register(user);
            self.state
                .presence()
                .upsert(PresenceRecord::new(conn.user(), conn.id()));
            conn.set_state(ConnectionState::Active);
            (conn, rx)
        }

        pub async fn send(&self, from: &str, to: Snowflake, content: &str) {
            MessageService::new(self.state.service_context())
                .send(from, to, content.to_string())
                .await
                .unwrap();
        }
    }

    /// Every dispatch frame queued so far
    pub fn drain(rx: &mut mpsc::Receiver<Outbound>) -> Vec<GatewayMessage> {
        let mut frames = Vec::new();
        while let Ok(item) = rx.try_recv() {
            if let Outbound::Message(msg) = item {
                frames.push(msg);
            }
        }
        frames
    }

    pub fn event_names(frames: &[GatewayMessage]) -> Vec<&str> {
        frames.iter().filter_map(|f| f.t.as_deref()).collect()
    }
}
