//! Dialect catalog for explicit dependency injection.
//!
//! The [`DialectCatalog`] maps dialect names to [`Dialect`] implementations.
//! It is constructed once at startup and passed by reference to whoever
//! resolves the configured driver, instead of relying on a process-wide
//! registry populated by side effects.

use std::collections::HashMap;
use std::sync::Arc;

use super::traits::Dialect;
use crate::error::{MigrateError, Result};

/// Registry of migration dialects keyed by name.
///
/// # Example
///
/// ```rust
/// use scima::core::DialectCatalog;
/// use scima::drivers::{HanaDialect, PostgresDialect};
///
/// let mut catalog = DialectCatalog::new();
/// catalog.register_dialect("hana", HanaDialect::new());
/// catalog.register_dialect("postgres", PostgresDialect::new());
/// catalog.register_alias("pg", "postgres").unwrap();
///
/// assert_eq!(catalog.require_dialect("pg").unwrap().name(), "postgres");
/// assert!(catalog.require_dialect("oracle").is_err());
/// ```
#[derive(Default)]
pub struct DialectCatalog {
    dialects: HashMap<String, Arc<dyn Dialect>>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with the built-in dialects registered.
    ///
    /// Registers `hana`, `postgres` and the `pg` / `postgresql` aliases.
    pub fn with_builtins() -> Self {
        use crate::drivers::{HanaDialect, PostgresDialect};

        let mut catalog = Self::new();

        catalog.register_dialect("hana", HanaDialect::new());

        let postgres: Arc<dyn Dialect> = Arc::new(PostgresDialect::new());
        catalog.register_dialect_arc("postgres", postgres.clone());
        catalog.register_dialect_arc("pg", postgres.clone());
        catalog.register_dialect_arc("postgresql", postgres);

        catalog
    }

    /// Register a dialect by name, replacing any previous registration.
    pub fn register_dialect(&mut self, name: impl Into<String>, dialect: impl Dialect + 'static) {
        self.dialects.insert(name.into(), Arc::new(dialect));
    }

    /// Register a dialect as an Arc (for sharing).
    pub fn register_dialect_arc(&mut self, name: impl Into<String>, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(name.into(), dialect);
    }

    /// Make `alias` resolve to the dialect registered as `target`.
    pub fn register_alias(&mut self, alias: impl Into<String>, target: &str) -> Result<()> {
        let dialect = self.require_dialect(target)?;
        self.dialects.insert(alias.into(), dialect);
        Ok(())
    }

    /// Get a dialect by name.
    pub fn get_dialect(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        self.dialects.get(name).cloned()
    }

    /// Get a dialect by name, returning an error if not found.
    pub fn require_dialect(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        self.get_dialect(name)
            .ok_or_else(|| MigrateError::DialectNotFound(name.to_string()))
    }

    /// Check if a dialect is registered.
    pub fn has_dialect(&self, name: &str) -> bool {
        self.dialects.contains_key(name)
    }

    /// Get all registered names (aliases included), sorted.
    pub fn dialect_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
