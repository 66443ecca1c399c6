//! Database layer for Userhub
//!
//! This module provides the runtime-selected connection pool and the schema
//! bootstrap. The service speaks two SQL dialects, an embedded SQLite file
//! store or a networked MySQL server, chosen from the connection URL.
//!
//! # Modules
//!
//! - `pool`: connection pool creation, dialect selection, health check
//! - `schema`: idempotent `users` table creation
//!
//! # Example
//!
//! ```no_run
//! use userhub_shared::db::pool::{create_pool, DatabaseConfig, Dialect};
//! use userhub_shared::db::schema::init_schema;
//!
//! # async fn example() -> Result<(), sqlx::Error> {
//! let config = DatabaseConfig::default();
//! let dialect = Dialect::from_url(&config.url);
//! let pool = create_pool(config).await?;
//! init_schema(&pool, dialect).await?;
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod schema;

/// True when the error is the store rejecting a uniqueness constraint.
///
/// This is the only write-serialization mechanism the service relies on:
/// concurrent duplicate inserts/updates race at the database and the loser
/// sees this error.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
