//! Path utilities for commentctl.
//!
//! # Base Directories
//! - [`get_home_dir`] - `~/.commentctl/` (base directory for all data)
//! - [`get_uploads_dir`] - `~/.commentctl/uploads/` (shared uploads area)
//!
//! # Files
//! - [`get_config_path`] - `~/.commentctl/config.toml`
//! - [`get_database_path`] - `~/.commentctl/comments.db`
//! - [`backup_dir`] - `<uploads>/comments-backup/`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::constants::BACKUP_DIR_NAME;

/// Get the commentctl base directory.
///
/// Resolution order:
/// 1. `COMMENTCTL_HOME` environment variable (if set)
/// 2. `~/.commentctl/` (default)
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("COMMENTCTL_HOME")
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(".commentctl"))
}

/// Get the default config path: `~/.commentctl/config.toml`
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("config.toml"))
}

/// Get the default database path: `~/.commentctl/comments.db`
pub fn get_database_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("comments.db"))
}

/// Get the default uploads directory: `~/.commentctl/uploads/`
pub fn get_uploads_dir() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("uploads"))
}

/// Backup directory inside an uploads directory.
pub fn backup_dir(uploads_dir: &Path) -> PathBuf {
    uploads_dir.join(BACKUP_DIR_NAME)
}
