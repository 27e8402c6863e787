//! PostgreSQL migration dialect (Strategy pattern).
//!
//! PostgreSQL supports `CREATE TABLE IF NOT EXISTS`, uses `$n` parameter
//! placeholders and folds unquoted identifiers to lower case, so the
//! bookkeeping table is `schema_migrations`.

use async_trait::async_trait;
use tracing::debug;

use crate::core::traits::{collect_versions, qualify, AppliedVersions, Connection, Dialect};
use crate::error::Result;

/// Bookkeeping table name for PostgreSQL.
pub const PG_MIGRATIONS_TABLE: &str = "schema_migrations";

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn migration_table(&self, schema: Option<&str>) -> String {
        qualify(schema, PG_MIGRATIONS_TABLE)
    }

    async fn ensure_migration_table(
        &self,
        conn: &dyn Connection,
        schema: Option<&str>,
    ) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (version BIGINT PRIMARY KEY)",
            self.migration_table(schema)
        );
        conn.execute(&sql, &[]).await?;
        Ok(())
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
                // No history yet: create the table and report nothing applied
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
            "INSERT INTO {} (version) VALUES ($1)",
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
            "DELETE FROM {} WHERE version = $1",
            self.migration_table(schema)
        );
        conn.execute(&sql, &[version]).await?;
        Ok(())
    }
}
