//! Service layer error types
//!
//! Every failure a hub operation can surface falls in one of three buckets:
//! the caller could not be identified, a referenced user does not exist, or
//! the store failed. Anything else is internal.

use dm_common::AppError;
use dm_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Caller identity could not be resolved
    Auth(AppError),

    /// A referenced identity does not exist
    NotFound { resource: &'static str, id: String },

    /// Persistence layer unavailable; the operation may be retried as a whole
    Store(DomainError),

    /// Other domain rule violation
    Domain(DomainError),

    /// Application error (configuration, internal)
    App(AppError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "Authentication failed: {e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Store(e) => write!(f, "Store unavailable: {e}"),
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auth(e) | Self::App(e) => Some(e),
            Self::Store(e) | Self::Domain(e) => Some(e),
            Self::NotFound { .. } => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create an authentication failure
    pub fn auth(err: AppError) -> Self {
        Self::Auth(err)
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the store failed and the whole operation may be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Auth(_) => 401,
            Self::NotFound { .. } => 404,
            Self::Store(_) => 503,
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else {
                    500
                }
            }
            Self::App(e) => e.status_code(),
        }
    }

    /// Get the error code sent to clients
    pub fn error_code(&self) -> &str {
        match self {
            Self::Auth(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Store(_) => "STORE_UNAVAILABLE",
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UserNotFound(id) => Self::not_found("User", id.to_string()),
            DomainError::UnknownUsername(name) => Self::not_found("User", name),
            e if e.is_transient() => Self::Store(e),
            e => Self::Domain(e),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        if err.is_auth_failure() {
            Self::Auth(err)
        } else {
            Self::App(err)
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Auth(e) | ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Store(e) | ServiceError::Domain(e) => AppError::Domain(e),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::Snowflake;

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("User", "123");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("User not found: 123"));
    }

    #[test]
    fn test_domain_errors_are_classified() {
        let err = ServiceError::from(DomainError::UserNotFound(Snowflake::new(7)));
        assert!(err.is_not_found());

        let err = ServiceError::from(DomainError::DatabaseError("pool timed out".to_string()));
        assert!(err.is_transient());
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_token_errors_become_auth_failures() {
        let err = ServiceError::from(AppError::TokenExpired);
        assert!(err.is_auth_failure());
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "TOKEN_EXPIRED");

        let err = ServiceError::from(AppError::Config("x".to_string()));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::not_found("User", "456").into();
        assert_eq!(app_err.status_code(), 404);

        let app_err: AppError = ServiceError::auth(AppError::InvalidToken).into();
        assert_eq!(app_err.status_code(), 401);
    }
}
