//! Shared constants.

/// Default HTTP port for `commentctl serve`.
pub const DEFAULT_PORT: u16 = 9920;

/// Default bind address for `commentctl serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default table prefix of the host schema.
pub const DEFAULT_TABLE_PREFIX: &str = "wp_";

/// Backup directory name under the uploads directory.
pub const BACKUP_DIR_NAME: &str = "comments-backup";

/// File name prefix shared by every backup document and archive.
pub const BACKUP_FILE_PREFIX: &str = "comments-backup-";

/// Timestamp format embedded in backup file names (second resolution).
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Timestamp format of the `date` field inside a backup document.
pub const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder dropped into the backup directory to block directory listing.
pub const PLACEHOLDER_FILE: &str = "index.html";

/// Read size for artifact downloads.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Default age after which undownloaded archives are swept.
pub const DEFAULT_RETENTION_HOURS: u64 = 24;

/// Default nonce validity window.
pub const DEFAULT_NONCE_LIFETIME_SECS: u64 = 86_400;
