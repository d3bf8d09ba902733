//! `commentctl purge`
//!
//! Takes a backup and copies it next to the caller first (unless
//! `--skip-backup`), asks for confirmation (unless `--yes`), then runs the
//! bulk delete.

use anyhow::{Context, Result};

use crate::app::App;
use crate::store::{PurgeReport, StatusSelector};
use crate::utils;

/// Options for one purge run.
#[derive(Debug, Clone, Copy)]
pub struct PurgeOptions {
    pub selector: StatusSelector,
    pub assume_yes: bool,
    pub skip_backup: bool,
}

/// Execute the purge command. Returns `None` when the user declined.
pub async fn execute(app: &App, opts: PurgeOptions) -> Result<Option<PurgeReport>> {
    if !opts.skip_backup {
        let artifact = super::backup::execute(app)
            .await
            .context("Refusing to delete without a backup (use --skip-backup to override)")?;
        super::download::execute(app, &artifact.file, None).await?;
    }

    if !opts.assume_yes {
        let confirmed = utils::confirm(&opts.selector.confirmation_prompt())
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(None);
        }
    }

    let report = app.purger.execute(opts.selector).await?;
    println!("{}", opts.selector.success_message());
    println!(
        "  {} comment(s), {} metadata row(s) removed; {} post(s) recounted",
        report.comments_deleted, report.meta_deleted, report.posts_recounted
    );
    Ok(Some(report))
}
