//! Error handling utilities for repositories

use dm_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
///
/// Every storage failure is reported as transient; callers surface it and may retry.
pub fn map_db_error(e: SqlxError) -> DomainError {
    tracing::warn!(error = %e, "Database operation failed");
    DomainError::DatabaseError(e.to_string())
}
