//! Backup generation: comments to JSON to a single-entry ZIP.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};

use super::archive::{ArchiveWriter, ZipArchiveWriter};
use super::sweep::sweep_expired;
use crate::audit::{AuditEvent, log_audit_event};
use crate::constants::{
    BACKUP_DATE_FORMAT, BACKUP_FILE_PREFIX, BACKUP_TIMESTAMP_FORMAT, PLACEHOLDER_FILE,
};
use crate::error::{Error, FsStep, Result};
use crate::store::CommentService;

/// Upper bound on same-second suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// A backup archive on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupArtifact {
    /// Archive file name, without directory.
    pub file: String,
    #[serde(skip)]
    pub path: PathBuf,
}

/// JSON document stored inside the archive.
#[derive(Debug, Clone, Serialize)]
pub struct BackupDocument {
    pub date: String,
    pub comments: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Result of a backup request as seen by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Created(BackupArtifact),
    Failed { message: String },
}

impl From<Result<BackupArtifact>> for BackupOutcome {
    fn from(result: Result<BackupArtifact>) -> Self {
        match result {
            Ok(artifact) => Self::Created(artifact),
            Err(e) => Self::Failed {
                message: format!("Backup failed: {}", e.user_message()),
            },
        }
    }
}

/// Produces backup archives in one directory.
#[derive(Clone)]
pub struct BackupGenerator {
    store: CommentService,
    dir: PathBuf,
    archiver: Arc<dyn ArchiveWriter>,
    retention: Option<Duration>,
}

impl BackupGenerator {
    pub fn new(store: CommentService, dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            dir: dir.into(),
            archiver: Arc::new(ZipArchiveWriter),
            retention: None,
        }
    }

    /// Uses a different archive writer.
    #[must_use]
    pub fn with_archiver<A: ArchiveWriter>(mut self, archiver: A) -> Self {
        self.archiver = Arc::new(archiver);
        self
    }

    /// Sweeps artifacts older than `hours` before each backup. Zero disables it.
    #[must_use]
    pub fn with_retention_hours(mut self, hours: u64) -> Self {
        self.retention = (hours > 0).then(|| Duration::from_secs(hours.saturating_mul(3600)));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates a backup stamped with the current local time.
    ///
    /// # Errors
    ///
    /// See [`BackupGenerator::generate_at`].
    pub async fn generate(&self) -> Result<BackupArtifact> {
        self.generate_at(Local::now()).await
    }

    /// Creates a backup stamped with `now`.
    ///
    /// # Errors
    ///
    /// In check order: [`Error::CompressionUnavailable`], [`Error::DataStore`]
    /// (before any file is touched), then [`Error::FileSystem`] or
    /// [`Error::Archive`] naming the failed step. Every failure is logged.
    pub async fn generate_at(&self, now: DateTime<Local>) -> Result<BackupArtifact> {
        let result = self.run(now).await;
        match &result {
            Ok(artifact) => {
                let bytes = fs::metadata(&artifact.path).map(|m| m.len()).unwrap_or(0);
                log_audit_event(AuditEvent::BackupCreated {
                    file: artifact.file.clone(),
                    bytes,
                });
            },
            Err(e) => error!(error = %e, "Comment backup failed"),
        }
        result
    }

    async fn run(&self, now: DateTime<Local>) -> Result<BackupArtifact> {
        if !self.archiver.is_available() {
            return Err(Error::CompressionUnavailable(
                "ZIP compression is not available on this server".into(),
            ));
        }

        let rows = self.store.export_comments().await?;
        let document = BackupDocument {
            date: now.format(BACKUP_DATE_FORMAT).to_string(),
            comments: rows.iter().map(|r| r.to_json_object()).collect(),
        };
        let json = serde_json::to_vec(&document)?;

        let dir = self.dir.clone();
        let archiver = Arc::clone(&self.archiver);
        let retention = self.retention;
        let stamp = now.format(BACKUP_TIMESTAMP_FORMAT).to_string();

        tokio::task::spawn_blocking(move || {
            if let Some(max_age) = retention {
                if let Err(e) = sweep_expired(&dir, max_age, SystemTime::now()) {
                    warn!(error = %e, "Retention sweep failed, continuing with backup");
                }
            }
            write_artifact(&dir, archiver.as_ref(), &stamp, &json)
        })
        .await?
    }
}

/// Creates the backup directory and its placeholder on first use.
///
/// # Errors
///
/// Returns [`Error::FileSystem`] if the directory or placeholder cannot be written.
pub fn ensure_backup_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| Error::fs(FsStep::CreateDirectory, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755))
            .map_err(|e| Error::fs(FsStep::CreateDirectory, e))?;
    }

    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dir.join(PLACEHOLDER_FILE))
    {
        Ok(_) => {},
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {},
        Err(e) => return Err(Error::fs(FsStep::WritePlaceholder, e)),
    }

    info!(dir = %dir.display(), "Created backup directory");
    Ok(())
}

/// Claims a free `<stem>.json` in `dir`, adding `-1`, `-2`, ... when an
/// archive or intermediate with that stem already exists.
fn reserve_stem(dir: &Path, stamp: &str) -> Result<(String, fs::File)> {
    let base = format!("{BACKUP_FILE_PREFIX}{stamp}");
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let stem = if attempt == 0 {
            base.clone()
        } else {
            format!("{base}-{attempt}")
        };
        if dir.join(format!("{stem}.zip")).exists() {
            continue;
        }
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(format!("{stem}.json")))
        {
            Ok(file) => return Ok((stem, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {},
            Err(e) => return Err(Error::fs(FsStep::WriteJson, e)),
        }
    }
    Err(Error::fs(
        FsStep::WriteJson,
        io::Error::new(io::ErrorKind::AlreadyExists, "no free backup file name"),
    ))
}

fn write_artifact(
    dir: &Path,
    archiver: &dyn ArchiveWriter,
    stamp: &str,
    json: &[u8],
) -> Result<BackupArtifact> {
    ensure_backup_dir(dir)?;

    let (stem, mut json_file) = reserve_stem(dir, stamp)?;
    let json_name = format!("{stem}.json");
    let json_path = dir.join(&json_name);
    let zip_name = format!("{stem}.zip");
    let zip_path = dir.join(&zip_name);

    let written = json_file.write_all(json).and_then(|()| json_file.sync_all());
    drop(json_file);
    if let Err(e) = written {
        let _ = fs::remove_file(&json_path);
        return Err(Error::fs(FsStep::WriteJson, e));
    }

    let archived = archiver.write_single_entry(&json_path, &json_name, &zip_path);
    if let Err(e) = fs::remove_file(&json_path) {
        warn!(file = %json_name, error = %e, "Failed to remove intermediate JSON file");
    }
    archived?;

    Ok(BackupArtifact {
        file: zip_name,
        path: zip_path,
    })
}
