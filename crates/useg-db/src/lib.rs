//! # useg-db
//!
//! Storage layer implementing the repository traits from `useg-core`.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations for PostgreSQL
//! - `PgIdentityRepository` for users and segments
//! - `PgMembershipRepository` for transactional membership writes
//! - `InMemoryStore`, a drop-in replacement for both used by tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use useg_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use useg_db::repositories::PgIdentityRepository;
//! use useg_core::traits::IdentityRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool, "./migrations").await?;
//!     let identity = PgIdentityRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{InMemoryStore, InMemoryTransaction};
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgIdentityRepository, PgMembershipRepository, PgMembershipTransaction};
