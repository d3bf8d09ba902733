//! Retention sweep for forgotten backup artifacts.
//!
//! Archives that were created but never downloaded stay on disk until the
//! sweep removes them. Only `comments-backup-*.zip` and stray
//! `comments-backup-*.json` intermediates are eligible.

use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::constants::BACKUP_FILE_PREFIX;
use crate::error::{Error, FsStep, Result};

/// What a sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub removed: u64,
    pub bytes_freed: u64,
}

/// Whether `name` is a file the sweep may delete.
pub fn is_backup_file_name(name: &str) -> bool {
    name.starts_with(BACKUP_FILE_PREFIX)
        && Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == "zip" || ext == "json")
}

fn is_older_than(meta: &fs::Metadata, cutoff: SystemTime) -> bool {
    meta.modified()
        .map(|modified| modified < cutoff)
        .unwrap_or(false)
}

/// Removes backup files in `dir` last modified more than `max_age` before `now`.
///
/// A missing directory is an empty sweep. Files that vanish or cannot be
/// removed mid-sweep are logged and skipped.
///
/// # Errors
///
/// Returns [`Error::FileSystem`] if the directory exists but cannot be listed.
pub fn sweep_expired(dir: &Path, max_age: Duration, now: SystemTime) -> Result<SweepReport> {
    let mut report = SweepReport::default();
    if !dir.is_dir() {
        return Ok(report);
    }

    let cutoff = now.checked_sub(max_age).unwrap_or(SystemTime::UNIX_EPOCH);
    let entries = fs::read_dir(dir).map_err(|e| Error::fs(FsStep::ScanDirectory, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::fs(FsStep::ScanDirectory, e))?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        if !is_backup_file_name(name) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() || !is_older_than(&meta, cutoff) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(file = %name, bytes = meta.len(), "Removed expired backup");
                report.removed += 1;
                report.bytes_freed += meta.len();
            },
            Err(e) => warn!(file = %name, error = %e, "Failed to remove expired backup"),
        }
    }

    if report.removed > 0 {
        info!(
            removed = report.removed,
            bytes_freed = report.bytes_freed,
            "Swept expired backups"
        );
    }
    Ok(report)
}
