//! `commentctl sweep`

use anyhow::Result;
use std::time::{Duration, SystemTime};

use crate::app::App;
use crate::backup::{SweepReport, sweep_expired};
use crate::config::Config;
use crate::utils::format_bytes;

/// Remove archives older than the configured retention.
pub fn execute(app: &App, config: &Config) -> Result<SweepReport> {
    let hours = config.backup.retention_hours;
    if hours == 0 {
        println!("Retention sweep disabled (backup.retention_hours = 0)");
        return Ok(SweepReport::default());
    }

    let max_age = Duration::from_secs(hours.saturating_mul(3600));
    let report = sweep_expired(app.backup_dir(), max_age, SystemTime::now())?;
    println!(
        "Removed {} expired backup(s), freed {}",
        report.removed,
        format_bytes(report.bytes_freed)
    );
    Ok(report)
}
