//! Identity service
//!
//! Read-only view of the identity collaborator: turns a connection credential
//! into a `User` and lists every known identity.

use dm_common::AppError;
use dm_core::entities::User;
use dm_core::Snowflake;
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Identity service
pub struct IdentityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IdentityService<'a> {
    /// Create a new IdentityService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve a connection credential to the caller's identity
    ///
    /// The token must validate, name an existing user, and carry that user's
    /// current username. Store failures are reported as such, everything else
    /// is an authentication failure.
    #[instrument(skip(self, credential))]
    pub async fn resolve(&self, credential: &str) -> ServiceResult<User> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_access_token(credential)
            .map_err(ServiceError::auth)?;
        let user_id = claims.user_id().map_err(ServiceError::auth)?;

        let Some(user) = self.ctx.user_repo().find_by_id(user_id).await? else {
            warn!(user_id = %user_id, "Token subject does not exist");
            return Err(ServiceError::auth(AppError::UnknownIdentity));
        };

        if user.username != claims.name {
            warn!(user_id = %user_id, "Token username is stale");
            return Err(ServiceError::auth(AppError::UnknownIdentity));
        }

        debug!(user_id = %user.id, username = %user.username, "Identity resolved");
        Ok(user)
    }

    /// Load the identity behind an already authenticated session
    ///
    /// A username that no longer resolves is an authentication failure.
    #[instrument(skip(self))]
    pub async fn current_user(&self, username: &str) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::auth(AppError::UnknownIdentity))
    }

    /// Find a referenced user by id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id.to_string()))
    }

    /// Every known identity
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> ServiceResult<Vec<User>> {
        Ok(self.ctx.user_repo().list_all().await?)
    }
}
