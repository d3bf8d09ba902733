//! Application wiring shared by the CLI and the admin server.

use anyhow::{Context, Result};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::backup::BackupGenerator;
use crate::config::Config;
use crate::purge::PurgeExecutor;
use crate::security::{AdminToken, NonceAction, NonceIssuer};
use crate::store::CommentService;

/// Route of the one-time download endpoint.
pub const DOWNLOAD_PATH: &str = "/admin/comments/backup/download";

/// Every component an admin action needs.
#[derive(Clone)]
pub struct App {
    pub store: CommentService,
    pub purger: PurgeExecutor,
    pub generator: BackupGenerator,
    pub nonces: NonceIssuer,
    pub admin_token: AdminToken,
    backup_dir: PathBuf,
    public_url: String,
    chunk_size: usize,
}

impl App {
    /// Builds the application over an opened store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup directory cannot be resolved.
    pub fn new(store: CommentService, config: &Config) -> Result<Self> {
        let backup_dir = config
            .backup_dir()
            .context("Failed to resolve backup directory")?;

        let secret = match (
            config.auth.nonce_secret.as_deref(),
            config.auth.admin_token.as_deref(),
        ) {
            (Some(secret), _) if !secret.is_empty() => secret.to_string(),
            (_, Some(token)) if !token.is_empty() => token.to_string(),
            _ => {
                warn!("No nonce secret or admin token configured, nonces only last for this process");
                format!(
                    "ephemeral:{}:{}",
                    std::process::id(),
                    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
                )
            },
        };

        let generator = BackupGenerator::new(store.clone(), &backup_dir)
            .with_retention_hours(config.backup.retention_hours);

        Ok(Self {
            purger: PurgeExecutor::new(store.clone()),
            generator,
            nonces: NonceIssuer::new(&secret, config.auth.nonce_lifetime_secs),
            admin_token: AdminToken::new(config.auth.admin_token.clone()),
            store,
            backup_dir,
            public_url: config.public_url(),
            chunk_size: config.backup.chunk_size.max(1),
        })
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Absolute one-time download link for `file`, carrying a fresh nonce.
    pub fn download_url(&self, file: &str) -> String {
        let nonce = self.nonces.issue(NonceAction::DownloadBackup);
        format!(
            "{}{DOWNLOAD_PATH}?file={}&nonce={nonce}",
            self.public_url,
            utf8_percent_encode(file, NON_ALPHANUMERIC)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(uploads: &Path) -> Config {
        let mut config = Config::default();
        config.backup.uploads_dir = Some(uploads.to_path_buf());
        config.server.public_url = Some("https://blog.example/".into());
        config.auth.admin_token = Some("admin-token-0123456789".into());
        config
    }

    #[test]
    fn test_backup_dir_under_uploads() {
        let tmp = TempDir::new().unwrap();
        let app = App::new(CommentService::memory("wp_").unwrap(), &config(tmp.path())).unwrap();
        assert_eq!(app.backup_dir(), tmp.path().join("comments-backup"));
        assert_eq!(app.chunk_size(), 8192);
    }

    #[test]
    fn test_download_url_encodes_and_signs() {
        let tmp = TempDir::new().unwrap();
        let app = App::new(CommentService::memory("wp_").unwrap(), &config(tmp.path())).unwrap();

        let url = app.download_url("comments-backup-2025-01-01-00-00-00.zip");
        let prefix = "https://blog.example/admin/comments/backup/download?file=comments%2Dbackup%2D2025%2D01%2D01%2D00%2D00%2D00%2Ezip&nonce=";
        assert!(url.starts_with(prefix), "{url}");

        let nonce = &url[prefix.len()..];
        assert!(app.nonces.verify(NonceAction::DownloadBackup, nonce));
        assert!(!app.nonces.verify(NonceAction::DeleteComments, nonce));
    }

    #[test]
    fn test_nonce_secret_falls_back_to_admin_token() {
        let tmp = TempDir::new().unwrap();
        let a = App::new(CommentService::memory("wp_").unwrap(), &config(tmp.path())).unwrap();
        let b = App::new(CommentService::memory("wp_").unwrap(), &config(tmp.path())).unwrap();
        let nonce = a.nonces.issue(NonceAction::CommentsBackup);
        assert!(b.nonces.verify(NonceAction::CommentsBackup, &nonce));
    }
}
