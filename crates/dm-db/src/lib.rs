//! # dm-db
//!
//! Storage layer implementing the `dm-core` repository traits.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model to entity mappers
//! - PostgreSQL repositories
//! - In-memory repositories for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dm_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use dm_db::PgMessageRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let messages = PgMessageRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryMessageRepository, MemoryUserRepository};
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgMessageRepository, PgUserRepository};
