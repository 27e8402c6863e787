//! Database driver implementations.
//!
//! This module provides database-specific implementations of the core traits:
//!
//! - [`hana`]: SAP HANA (ODBC)
//! - [`postgres`]: PostgreSQL (tokio-postgres)
//!
//! # Adding New Databases
//!
//! To add support for a new database:
//!
//! 1. Create a new module under `drivers/` (e.g., `drivers/mysql/`)
//! 2. Implement the `Dialect` trait (and a `Connection` adapter if the
//!    database needs a new client)
//! 3. Register the dialect in `DialectCatalog::with_builtins()`
//! 4. Open its connection in [`connect`]
//! 5. Gate the driver with a feature flag in `Cargo.toml` if it links native
//!    libraries

pub mod hana;
pub mod postgres;

use std::sync::Arc;

pub use hana::HanaDialect;
#[cfg(feature = "odbc")]
pub use hana::OdbcConnection;
pub use postgres::{PgConnection, PostgresDialect};

use crate::core::traits::Connection;
use crate::error::{MigrateError, Result};

/// Open the connection matching a dialect's canonical name.
///
/// Resolve the configured driver through the
/// [`DialectCatalog`](crate::core::DialectCatalog) first, so aliases map to
/// the canonical name and unknown drivers fail before any network access.
pub async fn connect(dialect_name: &str, dsn: &str) -> Result<Arc<dyn Connection>> {
    if dsn.trim().is_empty() {
        return Err(MigrateError::Config("dsn required".into()));
    }

    match dialect_name {
        "postgres" => Ok(Arc::new(PgConnection::connect(dsn).await?)),
        #[cfg(feature = "odbc")]
        "hana" => Ok(Arc::new(OdbcConnection::connect(dsn).await?)),
        #[cfg(not(feature = "odbc"))]
        "hana" => Err(MigrateError::Config(
            "the hana driver connects through ODBC; rebuild with the 'odbc' feature".into(),
        )),
        other => Err(MigrateError::Config(format!(
            "No connection driver for dialect '{}'. Supported: hana, postgres",
            other
        ))),
    }
}
