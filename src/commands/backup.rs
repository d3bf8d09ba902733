//! `commentctl backup`

use anyhow::{Result, bail};

use crate::app::App;
use crate::backup::{BackupArtifact, BackupOutcome};
use crate::ui;
use crate::utils::format_bytes;

/// Create a backup and print where it landed.
pub async fn execute(app: &App) -> Result<BackupArtifact> {
    match BackupOutcome::from(app.generator.generate().await) {
        BackupOutcome::Created(artifact) => {
            let size = std::fs::metadata(&artifact.path).map(|m| m.len()).unwrap_or(0);
            println!("Backup created successfully");
            println!("  File: {} ({})", artifact.file, format_bytes(size));
            println!("  Path: {}", artifact.path.display());
            Ok(artifact)
        },
        BackupOutcome::Failed { message } => {
            ui::print_error_box("Backup failed", Some(&message));
            bail!(message)
        },
    }
}
