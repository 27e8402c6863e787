//! Configuration loading and validation.
//!
//! Precedence, highest first: command-line flags ([`ConfigOverrides`]), the
//! config file, built-in defaults. Loading never validates, because the DSN
//! may still arrive as a flag; call [`Config::validate`] once everything is
//! merged.

mod types;
mod validation;

pub use types::*;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// File names probed by [`Config::discover`], in order.
pub const DEFAULT_CONFIG_FILES: &[&str] =
    &["scima.yaml", "scima.yml", "scima.json", "scima.toml"];

impl Config {
    /// Load configuration from a file. `.json` files are parsed as JSON,
    /// `.toml` files as TOML, everything else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        debug!("Loading configuration from {}", path.display());
        match extension.as_str() {
            "json" => Self::from_json(&content),
            "toml" => Self::from_toml(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config.normalized())
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config.normalized())
    }

    /// Load the first default config file found in the working directory,
    /// or fall back to defaults.
    pub fn discover() -> Result<Self> {
        Self::discover_in(Path::new("."))
    }

    /// Like [`Config::discover`], searching `dir`.
    pub fn discover_in(dir: &Path) -> Result<Self> {
        match Self::find_default_file(dir) {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file found in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    /// First of [`DEFAULT_CONFIG_FILES`] that exists in `dir`.
    pub fn find_default_file(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if overrides.is_empty() {
            return self;
        }
        if let Some(driver) = overrides.driver {
            self.driver = driver;
        }
        if let Some(dsn) = overrides.dsn {
            self.dsn = dsn;
        }
        if let Some(dir) = overrides.migrations_dir {
            self.migrations_dir = dir;
        }
        if let Some(schema) = overrides.schema {
            self.schema = Some(schema);
        }
        self.normalized()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Schema as passed to the migrator.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    fn normalized(mut self) -> Self {
        self.driver = self.driver.trim().to_lowercase();
        self.schema = self
            .schema
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_yaml_defaults() {
        let config = Config::from_yaml("dsn: host=localhost").unwrap();
        assert_eq!(config.driver, "hana");
        assert_eq!(config.dsn, "host=localhost");
        assert_eq!(config.migrations_dir, PathBuf::from("./migrations"));
        assert_eq!(config.schema, None);

        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_yaml_alias_and_empty_schema() {
        let yaml = r#"
driver: PG
dsn: "host=db user=app"
migrationsdir: db/changes
schema: ""
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.driver, "pg");
        assert_eq!(config.migrations_dir, PathBuf::from("db/changes"));
        assert_eq!(config.schema(), None);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("scima.json");
        std::fs::write(
            &json,
            r#"{"driver": "postgres", "dsn": "host=x", "schema": "app"}"#,
        )
        .unwrap();

        let config = Config::load(&json).unwrap();
        assert_eq!(config.driver, "postgres");
        assert_eq!(config.schema(), Some("app"));

        let yaml = dir.path().join("settings.conf");
        std::fs::write(&yaml, "dsn: host=y\n").unwrap();
        assert_eq!(Config::load(&yaml).unwrap().dsn, "host=y");
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scima.toml");
        std::fs::write(
            &path,
            "driver = \"postgres\"\ndsn = \"host=x\"\nmigrationsdir = \"db\"\nschema = \"app\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.driver, "postgres");
        assert_eq!(config.dsn, "host=x");
        assert_eq!(config.migrations_dir, PathBuf::from("db"));
        assert_eq!(config.schema(), Some("app"));

        assert_eq!(Config::from_toml("").unwrap(), Config::default());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "driver = postgres\n").unwrap();
        let err = Config::load(&bad).unwrap_err();
        assert!(matches!(err, crate::error::MigrateError::Toml(_)));
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_discover_finds_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("scima.toml"), "dsn = \"from-toml\"\n").unwrap();
        assert_eq!(Config::discover_in(dir.path()).unwrap().dsn, "from-toml");

        // YAML still wins when both exist
        std::fs::write(dir.path().join("scima.yaml"), "dsn: from-yaml\n").unwrap();
        assert_eq!(Config::discover_in(dir.path()).unwrap().dsn, "from-yaml");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, crate::error::MigrateError::Io(_)));
    }

    #[test]
    fn test_discover_prefers_yaml() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::discover_in(dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join("scima.json"), r#"{"dsn": "from-json"}"#).unwrap();
        assert_eq!(Config::discover_in(dir.path()).unwrap().dsn, "from-json");

        std::fs::write(dir.path().join("scima.yaml"), "dsn: from-yaml\n").unwrap();
        assert_eq!(Config::discover_in(dir.path()).unwrap().dsn, "from-yaml");
    }

    #[test]
    fn test_overrides_only_when_given() {
        let config = Config::from_yaml("driver: postgres\ndsn: file-dsn\nschema: app\n").unwrap();

        let merged = config.clone().with_overrides(ConfigOverrides {
            dsn: Some("flag-dsn".into()),
            ..Default::default()
        });
        assert_eq!(merged.driver, "postgres");
        assert_eq!(merged.dsn, "flag-dsn");
        assert_eq!(merged.schema(), Some("app"));

        let cleared = config.with_overrides(ConfigOverrides {
            schema: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(cleared.schema(), None);
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let config = Config::from_yaml("dsn: \"UID=admin;PWD=hunter2\"").unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
