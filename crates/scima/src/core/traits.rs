//! Core traits for database-agnostic schema migration.
//!
//! This module defines the two seams of the migration engine:
//!
//! - [`Connection`]: executes SQL against one open database connection
//! - [`Dialect`]: owns the bookkeeping table (name, DDL, parameter style,
//!   existence checks) for one database engine
//!
//! # Design Patterns
//!
//! - **Adapter**: `Connection` narrows a driver client to the two calls the
//!   engine needs
//! - **Strategy**: `Dialect` implementations are interchangeable; the
//!   migrator only relies on the four bookkeeping operations

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::value::{Row, Rows};
use crate::error::{ConnError, Result};

/// Versions recorded in the bookkeeping table, ascending.
pub type AppliedVersions = BTreeSet<i64>;

/// Minimal SQL execution capability used by dialects and the migrator.
///
/// Statements are executed one at a time; no multi-statement splitting
/// happens at this level. Parameters are positional `BIGINT` values bound
/// with the dialect's placeholder syntax (`?` or `$1`).
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a statement that returns no rows.
    async fn execute(&self, sql: &str, params: &[i64]) -> std::result::Result<(), ConnError>;

    /// Run a query and fetch every row.
    ///
    /// An empty result is `Ok` with no rows, never an error.
    async fn query(&self, sql: &str, params: &[i64]) -> std::result::Result<Rows, ConnError>;

    /// Run a query expected to return at least one row.
    ///
    /// Returns [`ConnError::NoRows`] when the query succeeded but matched
    /// nothing, so callers can tell "absent" apart from a failed query.
    async fn query_one(&self, sql: &str, params: &[i64]) -> std::result::Result<Row, ConnError> {
        self.query(sql, params).await?.into_first()
    }

    /// Get the driver name for logging/debugging.
    fn driver_name(&self) -> &'static str;
}

/// Bookkeeping operations every database backend must implement.
///
/// The contract fixes the semantics of the four operations, not their SQL:
/// each dialect owns its table name, identifier casing, parameter placeholder
/// style and its way of detecting an existing table.
///
/// `schema` is the optional qualification of the bookkeeping table.
#[async_trait]
pub trait Dialect: Send + Sync {
    /// Canonical dialect name (e.g., "hana", "postgres").
    fn name(&self) -> &str;

    /// Bookkeeping table name, qualified with `schema` when one is set.
    fn migration_table(&self, schema: Option<&str>) -> String;

    /// Create the bookkeeping table if it does not exist.
    ///
    /// This must be idempotent: an "already exists" condition is success.
    async fn ensure_migration_table(&self, conn: &dyn Connection, schema: Option<&str>)
        -> Result<()>;

    /// Read every recorded version.
    ///
    /// A missing table is not an error: the dialect ensures the table and
    /// returns an empty set.
    async fn select_applied_versions(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
    ) -> Result<AppliedVersions>;

    /// Record one applied version. Fails if the version is already recorded.
    async fn insert_version(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        version: i64,
    ) -> Result<()>;

    /// Remove one recorded version. Removing an absent version is not an error.
    async fn delete_version(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        version: i64,
    ) -> Result<()>;
}

/// Qualify a table name with an optional schema.
pub fn qualify(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => format!("{}.{}", schema, table),
        _ => table.to_string(),
    }
}

/// Decode the first column of every row as a version.
pub fn collect_versions(rows: Rows) -> Result<AppliedVersions> {
    let mut applied = AppliedVersions::new();
    for row in rows {
        applied.insert(row.get_i64(0)?);
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify() {
        assert_eq!(qualify(None, "schema_migrations"), "schema_migrations");
        assert_eq!(qualify(Some(""), "schema_migrations"), "schema_migrations");
        assert_eq!(
            qualify(Some("tenant1"), "SCHEMA_MIGRATIONS"),
            "tenant1.SCHEMA_MIGRATIONS"
        );
    }

    #[test]
    fn test_collect_versions() {
        let rows: Rows = ["30", "10", "20"]
            .iter()
            .map(|v| Row::new(vec![Some(v.to_string())]))
            .collect();
        let applied = collect_versions(rows).unwrap();
        assert_eq!(applied.into_iter().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_collect_versions_rejects_garbage() {
        let rows: Rows = vec![Row::new(vec![Some("ten".to_string())])]
            .into_iter()
            .collect();
        assert!(collect_versions(rows).is_err());
    }
}
