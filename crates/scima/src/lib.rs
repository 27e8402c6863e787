//! # scima
//!
//! Versioned SQL schema migrations for SAP HANA and PostgreSQL.
//!
//! Migrations are plain SQL files named `{version}_{name}.{up|down}.sql`.
//! The library provides:
//!
//! - **Directory scanning** with pairing and validation of up/down files
//! - **Schema placeholders** (`{{schema}}`, `{{schema?}}`) expanded per run
//! - **Dialects** owning the bookkeeping table for each database engine
//! - **Fail-stop execution**: each migration is recorded as soon as it
//!   succeeds, the first failure ends the run
//!
//! ## Example
//!
//! ```rust,no_run
//! use scima::{drivers, migrate, Config, DialectCatalog, Migrator};
//!
//! #[tokio::main]
//! async fn main() -> scima::Result<()> {
//!     let config = Config::load("scima.yaml")?;
//!     config.validate()?;
//!
//!     let catalog = DialectCatalog::with_builtins();
//!     let dialect = catalog.require_dialect(&config.driver)?;
//!     let conn = drivers::connect(dialect.name(), &config.dsn).await?;
//!     let migrator = Migrator::new(dialect, conn, config.schema.clone());
//!
//!     let pairs = migrate::scan_dir(&config.migrations_dir)?;
//!     migrate::validate(&pairs)?;
//!     let applied = migrator.status().await?;
//!     let summary = migrator.apply_up(&migrate::filter_pending(&pairs, &applied)).await?;
//!     println!("applied {} migrations", summary.count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod migrate;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use config::{Config, ConfigOverrides};
pub use crate::core::{AppliedVersions, Connection, Dialect, DialectCatalog};
pub use error::{MigrateError, Result};
pub use migrate::{
    Direction, MigrationFile, MigrationPair, MigrationStatus, Migrator, RunSummary, StatusEntry,
};
