//! SAP HANA migration dialect (Strategy pattern).
//!
//! HANA (before 2.0 SPS04) has no `CREATE TABLE IF NOT EXISTS`, uses `?`
//! parameter placeholders and folds unquoted identifiers to upper case, so
//! the bookkeeping table is `SCHEMA_MIGRATIONS`.
//!
//! # Existence detection
//!
//! Creation is attempted unconditionally. A failure whose text mentions
//! "exists" (any case) is treated as "already there". Any other failure is
//! double-checked with a zero-row probe; only if the probe fails too is the
//! error reported. The text match is a heuristic: a genuine error whose
//! message happens to contain "exists" is classified as success.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::traits::{collect_versions, qualify, AppliedVersions, Connection, Dialect};
use crate::error::{MigrateError, Result};

/// Bookkeeping table name for HANA.
pub const HANA_MIGRATIONS_TABLE: &str = "SCHEMA_MIGRATIONS";

/// SAP HANA dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct HanaDialect;

impl HanaDialect {
    /// Create a new HANA dialect instance.
    pub fn new() -> Self {
        Self
    }
}

/// Case-insensitive check for the "already exists" marker in an error text.
fn mentions_exists(message: &str) -> bool {
    message.to_lowercase().contains("exists")
}

#[async_trait]
impl Dialect for HanaDialect {
    fn name(&self) -> &str {
        "hana"
    }

    fn migration_table(&self, schema: Option<&str>) -> String {
        qualify(schema, HANA_MIGRATIONS_TABLE)
    }

    async fn ensure_migration_table(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
    ) -> Result<()> {
        let table = self.migration_table(schema);
        let create = format!("CREATE TABLE {} (version BIGINT PRIMARY KEY)", table);

        let create_err = match conn.execute(&create, &[]).await {
            Ok(()) => {
                debug!("Created migration table {}", table);
                return Ok(());
            }
            Err(e) => e,
        };

        if mentions_exists(&create_err.to_string()) {
            debug!("Migration table {} already exists", table);
            return Ok(());
        }

        let probe = format!("SELECT version FROM {} WHERE 1=0", table);
        match conn.query(&probe, &[]).await {
            Ok(_) => {
                warn!(
                    "Creating {} failed ({}), but the table is selectable; continuing",
                    table, create_err
                );
                Ok(())
            }
            Err(probe_err) => Err(MigrateError::MigrationTable {
                table,
                create: create_err,
                probe: probe_err,
            }),
        }
    }

    async fn select_applied_versions(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
    ) -> Result<AppliedVersions> {
        let table = self.migration_table(schema);
        match conn.query(&format!("SELECT version FROM {}", table), &[]).await {
            Ok(rows) => collect_versions(rows),
            Err(e) => {
                // Table not existing: treat as empty after creating it
                debug!("Reading {} failed ({}), ensuring table", table, e);
                if self.ensure_migration_table(conn, schema).await.is_err() {
                    return Err(e.into());
                }
                Ok(AppliedVersions::new())
            }
        }
    }

    async fn insert_version(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        version: i64,
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (version) VALUES (?)",
            self.migration_table(schema)
        );
        conn.execute(&sql, &[version]).await?;
        Ok(())
    }

    async fn delete_version(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
        version: i64,
    ) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE version = ?",
            self.migration_table(schema)
        );
        conn.execute(&sql, &[version]).await?;
        Ok(())
    }
}
