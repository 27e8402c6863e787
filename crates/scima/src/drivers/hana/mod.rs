//! SAP HANA driver.
//!
//! This module provides HANA-specific implementations:
//!
//! - [`HanaDialect`]: bookkeeping-table strategy for HANA
//! - [`OdbcConnection`]: ODBC connection adapter (requires the `odbc` feature
//!   and the SAP HANA ODBC driver `HDBODBC`)

#[cfg(feature = "odbc")]
mod conn;
mod dialect;

#[cfg(feature = "odbc")]
pub use conn::OdbcConnection;
pub use dialect::{HanaDialect, HANA_MIGRATIONS_TABLE};
