//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// ```yaml
/// driver: hana
/// dsn: "DRIVER=HDBODBC;SERVERNODE=hana:30015;UID=MIGRATOR;PWD=secret"
/// migrations_dir: ./migrations
/// schema: TENANT1
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Dialect name or alias (`hana`, `postgres`, `pg`).
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Driver-specific connection string.
    #[serde(default)]
    pub dsn: String,

    /// Directory holding `{version}_{name}.{up|down}.sql` files.
    #[serde(default = "default_migrations_dir", alias = "migrationsdir")]
    pub migrations_dir: PathBuf,

    /// Schema used for `{{schema}}` placeholders and the bookkeeping table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            dsn: String::new(),
            migrations_dir: default_migrations_dir(),
            schema: None,
        }
    }
}

// Custom Debug to keep credentials embedded in the DSN out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("driver", &self.driver)
            .field("dsn", &"[REDACTED]")
            .field("migrations_dir", &self.migrations_dir)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub driver: Option<String>,
    pub dsn: Option<String>,
    pub migrations_dir: Option<PathBuf>,
    pub schema: Option<String>,
}

impl ConfigOverrides {
    /// Whether no override was given at all.
    pub fn is_empty(&self) -> bool {
        self.driver.is_none()
            && self.dsn.is_none()
            && self.migrations_dir.is_none()
            && self.schema.is_none()
    }
}

fn default_driver() -> String {
    "hana".to_string()
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("./migrations")
}
