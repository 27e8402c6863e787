//! Migration model and engine.
//!
//! - [`parser`]: reads a migrations directory into ordered [`MigrationPair`]s
//! - [`placeholder`]: rewrites `{{schema}}` tokens in migration SQL
//! - [`migrator`]: applies and reverts migrations through a [`Dialect`](crate::core::Dialect)
//! - [`status`]: applied/pending report

pub mod migrator;
pub mod parser;
pub mod placeholder;
pub mod status;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use migrator::{Migrator, RunSummary};
pub use parser::{filter_pending, reverse_for_down, scan_dir, validate};
pub use placeholder::expand;
pub use status::{format_status, status_report, MigrationStatus, StatusEntry};

/// Direction of a migration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Apply the change.
    Up,
    /// Revert the change.
    Down,
}

impl Direction {
    /// Filename suffix keyword (`up` / `down`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One direction of one versioned migration, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Version parsed from the filename prefix.
    pub version: i64,

    /// Slug between the version and the direction suffix.
    pub name: String,

    /// Whether this file applies or reverts the change.
    pub direction: Direction,

    /// Path the file was read from.
    pub path: PathBuf,

    /// Raw SQL text, placeholders not yet expanded.
    pub sql: String,
}

/// Up and down files sharing one version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPair {
    pub up: Option<MigrationFile>,
    pub down: Option<MigrationFile>,
}

impl MigrationPair {
    /// Version of whichever file is present.
    pub fn version(&self) -> Option<i64> {
        self.up
            .as_ref()
            .or(self.down.as_ref())
            .map(|file| file.version)
    }

    /// Slot for the given direction.
    pub fn slot_mut(&mut self, direction: Direction) -> &mut Option<MigrationFile> {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(version: i64, direction: Direction) -> MigrationFile {
        MigrationFile {
            version,
            name: "init".into(),
            direction,
            path: PathBuf::from(format!("{}_init.{}.sql", version, direction)),
            sql: String::new(),
        }
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Down.to_string(), "down");
        assert_eq!(serde_json::to_string(&Direction::Down).unwrap(), "\"down\"");
    }

    #[test]
    fn test_pair_version() {
        let mut pair = MigrationPair::default();
        assert_eq!(pair.version(), None);

        *pair.slot_mut(Direction::Down) = Some(file(7, Direction::Down));
        assert_eq!(pair.version(), Some(7));
        assert!(pair.up.is_none());
    }
}
