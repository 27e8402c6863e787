//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
///
/// Runs before any database contact; the driver name itself is resolved
/// against the dialect catalog by the caller.
pub fn validate(config: &Config) -> Result<()> {
    if config.driver.trim().is_empty() {
        return Err(MigrateError::Config("driver is required".into()));
    }
    if config.dsn.trim().is_empty() {
        return Err(MigrateError::Config(
            "dsn is required (config file, --dsn or SCIMA_DSN)".into(),
        ));
    }
    if config.migrations_dir.as_os_str().is_empty() {
        return Err(MigrateError::Config("migrations_dir is required".into()));
    }
    if let Some(schema) = &config.schema {
        if schema.chars().any(char::is_whitespace) {
            return Err(MigrateError::Config(format!(
                "schema must not contain whitespace, got '{}'",
                schema
            )));
        }
    }

    Ok(())
}
