//! Gateway state
//!
//! Application state for the gateway server.

use crate::broadcast::DeliveryDispatcher;
use crate::connection::ConnectionManager;
use crate::presence::PresenceDirectory;
use dm_common::AppConfig;
use dm_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server. The presence
/// directory is owned here and handed to nothing outside the gateway.
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and services
    service_context: Arc<ServiceContext>,
    /// Live WebSocket connections
    connection_manager: Arc<ConnectionManager>,
    /// Online identities by username
    presence: Arc<PresenceDirectory>,
    /// Routes events to connections
    dispatcher: DeliveryDispatcher,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state with an empty presence directory
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        let connection_manager = ConnectionManager::new_shared();
        let presence = PresenceDirectory::new_shared();
        let dispatcher = DeliveryDispatcher::new(connection_manager.clone(), presence.clone());

        Self {
            service_context: Arc::new(service_context),
            connection_manager,
            presence,
            dispatcher,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    /// Get the presence directory
    pub fn presence(&self) -> &PresenceDirectory {
        &self.presence
    }

    /// Get the delivery dispatcher
    pub fn dispatcher(&self) -> &DeliveryDispatcher {
        &self.dispatcher
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connections", &self.connection_manager.connection_count())
            .field("online", &self.presence.len())
            .field("config", &"AppConfig")
            .finish()
    }
}
