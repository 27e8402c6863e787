//! Applied/pending status report.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::MigrationPair;
use crate::core::AppliedVersions;

/// State of one migration against the bookkeeping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    Applied,
    Pending,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStatus::Applied => f.write_str("applied"),
            MigrationStatus::Pending => f.write_str("pending"),
        }
    }
}

/// One line of the status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub version: i64,
    pub name: String,
    pub state: MigrationStatus,
}

/// One entry per version that has an up file, ascending.
pub fn status_report(pairs: &[MigrationPair], applied: &AppliedVersions) -> Vec<StatusEntry> {
    let mut entries: Vec<StatusEntry> = pairs
        .iter()
        .filter_map(|pair| pair.up.as_ref())
        .map(|up| StatusEntry {
            version: up.version,
            name: up.name.clone(),
            state: if applied.contains(&up.version) {
                MigrationStatus::Applied
            } else {
                MigrationStatus::Pending
            },
        })
        .collect();
    entries.sort_by_key(|entry| entry.version);
    entries
}

/// Text form: `{version:04}\t{name}\t{state}` per line.
pub fn format_status(entries: &[StatusEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{:04}\t{}\t{}\n", e.version, e.name, e.state))
        .collect()
}
