//! Service context - dependency container for services
//!
//! Holds the repositories, the token service and the id generator.

use std::sync::Arc;

use dm_common::auth::JwtService;
use dm_common::AppError;
use dm_core::traits::{MessageRepository, UserRepository};
use dm_core::{Snowflake, SnowflakeGenerator, DEFAULT_PAGE_SIZE};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    message_repo: Arc<dyn MessageRepository>,

    // Services
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    /// Messages per history page
    page_size: u32,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        message_repo: Arc<dyn MessageRepository>,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        page_size: u32,
    ) -> Self {
        Self {
            user_repo,
            message_repo,
            jwt_service,
            snowflake_generator,
            page_size: page_size.max(1),
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    page_size: u32,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            message_repo: None,
            jwt_service: None,
            snowflake_generator: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Build the ServiceContext
    ///
    /// A missing snowflake generator defaults to worker 0.
    ///
    /// # Errors
    /// Returns a configuration error if a repository or the JWT service is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo.ok_or_else(|| missing("user_repo"))?,
            self.message_repo.ok_or_else(|| missing("message_repo"))?,
            self.jwt_service.ok_or_else(|| missing("jwt_service"))?,
            self.snowflake_generator.unwrap_or_default(),
            self.page_size,
        ))
    }
}

fn missing(dependency: &str) -> ServiceError {
    ServiceError::App(AppError::Config(format!("{dependency} is required")))
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_db::{MemoryMessageRepository, MemoryUserRepository};

    #[test]
    fn test_builder_requires_repositories() {
        let err = ServiceContextBuilder::new()
            .jwt_service(Arc::new(JwtService::new("secret", 60)))
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = ServiceContextBuilder::new()
            .user_repo(Arc::new(MemoryUserRepository::new()))
            .message_repo(Arc::new(MemoryMessageRepository::new()))
            .jwt_service(Arc::new(JwtService::new("secret", 60)))
            .page_size(0)
            .build()
            .unwrap();

        assert_eq!(ctx.page_size(), 1);
        assert!(ctx.generate_id() < ctx.generate_id());
    }
}
