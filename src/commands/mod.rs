//! CLI command implementations for commentctl.
//!
//! - [`serve`] - Admin HTTP server
//! - [`stats`] - Print comment statistics
//! - [`purge`] - Bulk delete by status, with backup and confirmation
//! - [`backup`] - Create a backup archive
//! - [`download`] - Copy an archive out and delete it
//! - [`sweep`] - Remove expired archives

pub mod backup;
pub mod download;
pub mod purge;
pub mod serve;
pub mod stats;
pub mod sweep;

use anyhow::{Context, Result};
use tracing::warn;

use crate::app::App;
use crate::config::Config;
use crate::store::CommentService;

/// Validates `config`, opens the store and wires the application.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the database
/// cannot be opened.
pub async fn open_app(config: &Config) -> Result<App> {
    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    let db_path = config.database_path()?;
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let store = CommentService::file(&db_path, &config.database.table_prefix)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    store
        .ensure_schema()
        .await
        .context("Failed to prepare comment tables")?;

    App::new(store, config)
}
