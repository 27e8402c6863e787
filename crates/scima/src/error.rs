//! Error types for the migration library.

use std::path::PathBuf;

use thiserror::Error;

use crate::migrate::Direction;

/// Exit code for configuration errors (bad config file, unknown driver, missing DSN).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for migration file validation errors.
pub const EXIT_VALIDATION_ERROR: u8 = 2;
/// Exit code for placeholder expansion failures.
pub const EXIT_PLACEHOLDER_ERROR: u8 = 3;
/// Exit code for database and migration execution failures.
pub const EXIT_EXECUTION_ERROR: u8 = 4;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Error raised by a [`Connection`](crate::core::Connection) implementation.
#[derive(Error, Debug)]
pub enum ConnError {
    /// A query that was expected to return a row returned none.
    #[error("no rows returned")]
    NoRows,

    /// A returned value could not be decoded into the requested type.
    #[error("failed to decode column {column}: {message}")]
    Decode { column: usize, message: String },

    /// PostgreSQL driver error.
    #[error("postgres: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// PostgreSQL pool error (building the pool or checking out the client).
    #[error("postgres pool: {0}")]
    Pool(String),

    /// ODBC driver error.
    #[cfg(feature = "odbc")]
    #[error("odbc: {0}")]
    Odbc(#[from] odbc_api::Error),

    /// Any other driver-level failure, reported as text.
    #[error("{0}")]
    Driver(String),
}

impl ConnError {
    /// Whether this error only means "the query matched no rows".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConnError::NoRows)
    }
}

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (missing DSN, invalid YAML, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No dialect registered under the requested name
    #[error("Unknown dialect: {0}")]
    DialectNotFound(String),

    /// A migration filename carries a zero version or one that does not fit in 64 bits
    #[error("Invalid version in filename {file}: {message}")]
    InvalidVersion { file: String, message: String },

    /// A migration file exists but could not be read as UTF-8 text
    #[error("Cannot read migration file {path}")]
    MigrationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two files claim the same version and direction
    #[error("Duplicate {direction} migration for version {version}: {first} and {second}")]
    DuplicateMigration {
        version: i64,
        direction: Direction,
        first: PathBuf,
        second: PathBuf,
    },

    /// A down migration exists without its up migration
    #[error("Missing up migration for version {version}")]
    MissingUp { version: i64 },

    /// Up and down files of one version carry different names
    #[error("Name mismatch for version {version}: up={up} down={down}")]
    NameMismatch {
        version: i64,
        up: String,
        down: String,
    },

    /// Placeholder expansion failed
    #[error("{0}")]
    Placeholder(String),

    /// One migration step failed; earlier steps stay recorded
    #[error("{direction} migration {version} failed during {phase}")]
    Step {
        direction: Direction,
        version: i64,
        phase: &'static str,
        #[source]
        source: Box<MigrateError>,
    },

    /// The bookkeeping table could neither be created nor found
    #[error("Ensure migration table {table} failed: {probe} (create error: {create})")]
    MigrationTable {
        table: String,
        create: ConnError,
        probe: ConnError,
    },

    /// Database error outside of a migration step
    #[error("Database error: {0}")]
    Database(#[from] ConnError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MigrateError {
    /// Wrap a failure of one migration step with its version.
    pub fn step(
        direction: Direction,
        version: i64,
        phase: &'static str,
        source: impl Into<MigrateError>,
    ) -> Self {
        MigrateError::Step {
            direction,
            version,
            phase,
            source: Box::new(source.into()),
        }
    }

    /// Version of the migration that failed, for step errors.
    pub fn version(&self) -> Option<i64> {
        match self {
            MigrateError::Step { version, .. }
            | MigrateError::MissingUp { version }
            | MigrateError::NameMismatch { version, .. }
            | MigrateError::DuplicateMigration { version, .. } => Some(*version),
            _ => None,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_)
            | MigrateError::DialectNotFound(_)
            | MigrateError::Yaml(_)
            | MigrateError::Json(_)
            | MigrateError::Toml(_) => EXIT_CONFIG_ERROR,
            MigrateError::InvalidVersion { .. }
            | MigrateError::DuplicateMigration { .. }
            | MigrateError::MissingUp { .. }
            | MigrateError::NameMismatch { .. } => EXIT_VALIDATION_ERROR,
            MigrateError::Placeholder(_) => EXIT_PLACEHOLDER_ERROR,
            MigrateError::Step { source, .. } => match source.as_ref() {
                MigrateError::Placeholder(_) => EXIT_PLACEHOLDER_ERROR,
                _ => EXIT_EXECUTION_ERROR,
            },
            MigrateError::MigrationTable { .. } | MigrateError::Database(_) => {
                EXIT_EXECUTION_ERROR
            }
            MigrateError::Io(_) | MigrateError::MigrationRead { .. } => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
