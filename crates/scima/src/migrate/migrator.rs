//! Migration runner.
//!
//! Every migration is its own unit of work: expand placeholders, execute the
//! SQL, then record (or remove) the version. DDL is not transactional on
//! every backend, so the bookkeeping table is the durable progress record.
//! The first failure stops the run; completed steps stay recorded.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::placeholder::expand;
use super::{Direction, MigrationFile};
use crate::core::{AppliedVersions, Connection, Dialect};
use crate::error::{MigrateError, Result};

/// Outcome of an `up` or `down` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Direction of the run.
    pub direction: Direction,

    /// Versions processed, in execution order.
    pub versions: Vec<i64>,

    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,
}

impl RunSummary {
    /// Number of migrations processed.
    pub fn count(&self) -> usize {
        self.versions.len()
    }
}

/// Applies and reverts migrations on one connection.
pub struct Migrator {
    dialect: Arc<dyn Dialect>,
    conn: Arc<dyn Connection>,
    schema: Option<String>,
}

impl Migrator {
    /// Create a migrator. An empty schema counts as none.
    pub fn new(
        dialect: Arc<dyn Dialect>,
        conn: Arc<dyn Connection>,
        schema: Option<String>,
    ) -> Self {
        Self {
            dialect,
            conn,
            schema: schema.filter(|s| !s.is_empty()),
        }
    }

    /// Configured schema, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Qualified bookkeeping table name.
    pub fn migration_table(&self) -> String {
        self.dialect.migration_table(self.schema())
    }

    /// Create the bookkeeping table if needed.
    pub async fn ensure_migration_table(&self) -> Result<()> {
        self.dialect
            .ensure_migration_table(self.conn.as_ref(), self.schema())
            .await?;
        debug!("Migration table {} ready", self.migration_table());
        Ok(())
    }

    /// Versions currently recorded as applied.
    pub async fn status(&self) -> Result<AppliedVersions> {
        self.ensure_migration_table().await?;
        self.dialect
            .select_applied_versions(self.conn.as_ref(), self.schema())
            .await
    }

    /// Apply `files` in the given order (ascending for a pending list).
    pub async fn apply_up(&self, files: &[MigrationFile]) -> Result<RunSummary> {
        self.run(Direction::Up, files).await
    }

    /// Revert `files` in the given order (descending for a down plan).
    pub async fn apply_down(&self, files: &[MigrationFile]) -> Result<RunSummary> {
        self.run(Direction::Down, files).await
    }

    async fn run(&self, direction: Direction, files: &[MigrationFile]) -> Result<RunSummary> {
        let started = Instant::now();
        let mut versions = Vec::with_capacity(files.len());

        for file in files {
            self.step(direction, file).await?;
            versions.push(file.version);
        }

        Ok(RunSummary {
            direction,
            versions,
            duration_seconds: started.elapsed().as_secs_f64(),
        })
    }

    async fn step(&self, direction: Direction, file: &MigrationFile) -> Result<()> {
        let version = file.version;
        let schema = self.schema();

        let sql = expand(&file.sql, schema)
            .map_err(|e| MigrateError::step(direction, version, "placeholder expansion", e))?;
        debug!("{} {}: {}", direction, version, sql);

        let started = Instant::now();
        self.conn
            .execute(&sql, &[])
            .await
            .map_err(|e| MigrateError::step(direction, version, "execution", e))?;

        let conn = self.conn.as_ref();
        let recorded = match direction {
            Direction::Up => self.dialect.insert_version(conn, schema, version).await,
            Direction::Down => self.dialect.delete_version(conn, schema, version).await,
        };
        recorded.map_err(|e| MigrateError::step(direction, version, "bookkeeping", e))?;

        match direction {
            Direction::Up => info!(
                "Applied migration {} ({}) in {:?}",
                version,
                file.name,
                started.elapsed()
            ),
            Direction::Down => info!(
                "Reverted migration {} ({}) in {:?}",
                version,
                file.name,
                started.elapsed()
            ),
        }
        Ok(())
    }
}
