//! In-memory [`Connection`] used by unit tests.
//!
//! Understands just enough SQL to emulate a bookkeeping table: `CREATE TABLE
//! [IF NOT EXISTS]`, `INSERT INTO t (version) VALUES (..)`, `DELETE FROM t
//! WHERE version = ..` and `SELECT version FROM t`. Every other statement
//! succeeds unless a failure was injected for it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::traits::Connection;
use crate::core::value::{Row, Rows};
use crate::error::ConnError;

#[derive(Default)]
struct State {
    tables: BTreeMap<String, BTreeSet<i64>>,
    statements: Vec<String>,
    failures: Vec<(String, String)>,
}

pub(crate) struct MemoryConnection {
    state: Mutex<State>,
    /// Error text for a plain `CREATE TABLE` on an existing table.
    duplicate_table_message: String,
    missing_table_message: &'static str,
}

impl MemoryConnection {
    pub(crate) fn postgres() -> Self {
        Self {
            state: Mutex::new(State::default()),
            duplicate_table_message: "relation already exists".to_string(),
            missing_table_message: "relation does not exist:",
        }
    }

    pub(crate) fn hana(duplicate_table_message: &str) -> Self {
        Self {
            state: Mutex::new(State::default()),
            duplicate_table_message: duplicate_table_message.to_string(),
            missing_table_message: "invalid table name: Could not find table/view",
        }
    }

    /// Make every statement containing `needle` fail with `message`.
    pub(crate) fn fail_when_contains(&self, needle: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((needle.to_string(), message.to_string()));
    }

    /// Every statement seen so far, executed or queried, in order.
    pub(crate) fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    pub(crate) fn has_table(&self, table: &str) -> bool {
        self.state.lock().unwrap().tables.contains_key(table)
    }

    pub(crate) fn versions(&self, table: &str) -> Vec<i64> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn seed(&self, table: &str, versions: &[i64]) {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(table.to_string(), versions.iter().copied().collect());
    }
}

/// Table name following `keyword` in `sql`.
fn table_after(sql: &str, keyword: &str) -> Option<String> {
    let rest = &sql[sql.find(keyword)? + keyword.len()..];
    rest.split(|c: char| c.is_whitespace() || c == '(')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn param(params: &[i64]) -> Result<i64, ConnError> {
    params
        .first()
        .copied()
        .ok_or_else(|| ConnError::Driver("missing parameter".into()))
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn execute(&self, sql: &str, params: &[i64]) -> Result<(), ConnError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());

        if let Some((_, message)) = state.failures.iter().find(|(n, _)| sql.contains(n.as_str())) {
            return Err(ConnError::Driver(message.clone()));
        }

        if sql.starts_with("CREATE TABLE IF NOT EXISTS ") {
            let table = table_after(sql, "IF NOT EXISTS ").unwrap_or_default();
            state.tables.entry(table).or_default();
        } else if sql.starts_with("CREATE TABLE ") && sql.contains("(version BIGINT") {
            let table = table_after(sql, "CREATE TABLE ").unwrap_or_default();
            if state.tables.contains_key(&table) {
                return Err(ConnError::Driver(self.duplicate_table_message.clone()));
            }
            state.tables.insert(table, BTreeSet::new());
        } else if sql.starts_with("INSERT INTO ") && sql.contains("(version)") {
            let table = table_after(sql, "INSERT INTO ").unwrap_or_default();
            let version = param(params)?;
            let versions = state.tables.get_mut(&table).ok_or_else(|| {
                ConnError::Driver(format!("{} {}", self.missing_table_message, table))
            })?;
            if !versions.insert(version) {
                return Err(ConnError::Driver(format!(
                    "unique constraint violated: version {}",
                    version
                )));
            }
        } else if sql.starts_with("DELETE FROM ") && sql.contains("WHERE version") {
            let table = table_after(sql, "DELETE FROM ").unwrap_or_default();
            let version = param(params)?;
            let versions = state.tables.get_mut(&table).ok_or_else(|| {
                ConnError::Driver(format!("{} {}", self.missing_table_message, table))
            })?;
            versions.remove(&version);
        }

        Ok(())
    }

    async fn query(&self, sql: &str, _params: &[i64]) -> Result<Rows, ConnError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());

        if let Some((_, message)) = state.failures.iter().find(|(n, _)| sql.contains(n.as_str())) {
            return Err(ConnError::Driver(message.clone()));
        }

        let table = table_after(sql, "FROM ").unwrap_or_default();
        let versions = state.tables.get(&table).ok_or_else(|| {
            ConnError::Driver(format!("{} {}", self.missing_table_message, table))
        })?;

        if sql.contains("WHERE 1=0") {
            return Ok(Rows::default());
        }

        Ok(versions
            .iter()
            .map(|v| Row::new(vec![Some(v.to_string())]))
            .collect())
    }

    fn driver_name(&self) -> &'static str {
        "memory"
    }
}
