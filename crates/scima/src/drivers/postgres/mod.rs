//! PostgreSQL driver.
//!
//! This module provides PostgreSQL-specific implementations:
//!
//! - [`PostgresDialect`]: bookkeeping-table strategy for PostgreSQL
//! - [`PgConnection`]: tokio-postgres connection adapter

mod conn;
mod dialect;

pub use conn::PgConnection;
pub use dialect::{PostgresDialect, PG_MIGRATIONS_TABLE};
