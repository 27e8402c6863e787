//! Migration directory scanning and planning.
//!
//! Files are named `{version}_{name}.{up|down}.sql`, e.g.
//! `0010_create_users.up.sql`. Anything else in the directory is ignored,
//! and so are subdirectories.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{Direction, MigrationFile, MigrationPair};
use crate::core::AppliedVersions;
use crate::error::{MigrateError, Result};

static FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)_([A-Za-z0-9_]+)\.(up|down)\.sql$")
        .expect("migration filename pattern is valid")
});

/// Split a filename into version, name and direction.
///
/// Returns `Ok(None)` for files that are not migrations. Versions must be
/// positive and fit in an `i64`.
fn parse_filename(file_name: &str) -> Result<Option<(i64, String, Direction)>> {
    let caps = match FILENAME_RE.captures(file_name) {
        Some(caps) => caps,
        None => return Ok(None),
    };

    let version: i64 = caps[1]
        .parse()
        .map_err(|e: std::num::ParseIntError| MigrateError::InvalidVersion {
            file: file_name.to_string(),
            message: e.to_string(),
        })?;
    if version == 0 {
        return Err(MigrateError::InvalidVersion {
            file: file_name.to_string(),
            message: "version must be positive".to_string(),
        });
    }
    let direction = if &caps[3] == "up" {
        Direction::Up
    } else {
        Direction::Down
    };

    Ok(Some((version, caps[2].to_string(), direction)))
}

/// Read every migration file in `dir`, grouped per version, ascending.
pub fn scan_dir(dir: &Path) -> Result<Vec<MigrationPair>> {
    let mut by_version: BTreeMap<i64, MigrationPair> = BTreeMap::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some((version, name, direction)) = parse_filename(file_name)? else {
            debug!("Skipping non-migration file {}", file_name);
            continue;
        };

        let path = entry.path();
        let sql = fs::read_to_string(&path)
            .map_err(|source| MigrateError::MigrationRead {
                path: path.clone(),
                source,
            })?;

        let slot = by_version.entry(version).or_default().slot_mut(direction);
        if let Some(existing) = slot.as_ref() {
            return Err(MigrateError::DuplicateMigration {
                version,
                direction,
                first: existing.path.clone(),
                second: path,
            });
        }
        *slot = Some(MigrationFile {
            version,
            name,
            direction,
            path,
            sql,
        });
    }

    debug!(
        "Found {} migration versions in {}",
        by_version.len(),
        dir.display()
    );

    Ok(by_version.into_values().collect())
}

/// Check that every version has an up file and matching names.
pub fn validate(pairs: &[MigrationPair]) -> Result<()> {
    for pair in pairs {
        match (&pair.up, &pair.down) {
            (None, Some(down)) => {
                return Err(MigrateError::MissingUp {
                    version: down.version,
                })
            }
            (Some(up), Some(down)) if up.name != down.name => {
                return Err(MigrateError::NameMismatch {
                    version: up.version,
                    up: up.name.clone(),
                    down: down.name.clone(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

/// Up files not yet applied, ascending.
pub fn filter_pending(pairs: &[MigrationPair], applied: &AppliedVersions) -> Vec<MigrationFile> {
    let mut pending: Vec<MigrationFile> = pairs
        .iter()
        .filter_map(|pair| pair.up.as_ref())
        .filter(|up| !applied.contains(&up.version))
        .cloned()
        .collect();
    pending.sort_by_key(|file| file.version);
    pending
}

/// Down files of applied versions, newest first, at most `steps` of them.
///
/// `steps == 0` selects every applied version that has a down file.
pub fn reverse_for_down(
    pairs: &[MigrationPair],
    applied: &AppliedVersions,
    steps: usize,
) -> Vec<MigrationFile> {
    let mut downs: Vec<MigrationFile> = pairs
        .iter()
        .filter_map(|pair| pair.down.as_ref())
        .filter(|down| applied.contains(&down.version))
        .cloned()
        .collect();
    downs.sort_by(|a, b| b.version.cmp(&a.version));
    if steps > 0 {
        downs.truncate(steps);
    }
    downs
}
