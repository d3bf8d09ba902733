//! Configuration types for commentctl.
//!
//! Settings are loaded from a TOML file. Every section and field has a
//! default, so an empty file (or no file at all) yields a working local
//! setup:
//!
//! - [`Config`] - Root configuration struct
//! - [`DatabaseConfig`] - Comment database location and table prefix
//! - [`BackupConfig`] - Uploads area, retention and download chunking
//! - [`ServerConfig`] - HTTP admin surface
//! - [`AuthConfig`] - Admin token and nonce settings
//! - [`LoggingConfig`] - Log level and output format

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::paths;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub backup: BackupConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Comment database settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file. Defaults to `~/.commentctl/comments.db`.
    pub path: Option<PathBuf>,
    /// Prefix of the `posts`, `comments` and `commentmeta` tables.
    pub table_prefix: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            table_prefix: constants::DEFAULT_TABLE_PREFIX.to_string(),
        }
    }
}

/// Backup artifact settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Shared uploads area. Backups live in `<uploads_dir>/comments-backup`.
    pub uploads_dir: Option<PathBuf>,
    /// Archives older than this are swept. `0` disables the sweep.
    pub retention_hours: u64,
    /// Read size for streamed downloads.
    pub chunk_size: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            uploads_dir: None,
            retention_hours: constants::DEFAULT_RETENTION_HOURS,
            chunk_size: constants::DOWNLOAD_CHUNK_SIZE,
        }
    }
}

/// HTTP admin surface settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Base URL used when building download links.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: constants::DEFAULT_BIND.to_string(),
            port: constants::DEFAULT_PORT,
            public_url: None,
        }
    }
}

/// Authorization settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token granting the admin capability.
    pub admin_token: Option<String>,
    /// Key material for action nonces. Falls back to `admin_token`.
    pub nonce_secret: Option<String>,
    pub nonce_lifetime_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            nonce_secret: None,
            nonce_lifetime_secs: constants::DEFAULT_NONCE_LIFETIME_SECS,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from an explicit path, or from the default
    /// location if it exists, or fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing or any file found is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let default_path = paths::get_config_path()?;
        if default_path.exists() {
            Self::load_from(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolved database file path.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database.path {
            Some(p) => Ok(p.clone()),
            None => paths::get_database_path(),
        }
    }

    /// Resolved backup directory.
    pub fn backup_dir(&self) -> Result<PathBuf> {
        let uploads = match &self.backup.uploads_dir {
            Some(p) => p.clone(),
            None => paths::get_uploads_dir()?,
        };
        Ok(paths::backup_dir(&uploads))
    }

    /// Base URL for download links.
    pub fn public_url(&self) -> String {
        self.server.public_url.clone().map_or_else(
            || format!("http://{}:{}", self.server.bind, self.server.port),
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error listing every fatal problem:
    /// - Table prefix with characters outside `[A-Za-z0-9_]`
    /// - Zero port or zero chunk size
    /// - Nonce lifetime shorter than two seconds
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !is_valid_table_prefix(&self.database.table_prefix) {
            errors.push(format!(
                "database.table_prefix may only contain letters, digits and '_' (got: '{}')",
                self.database.table_prefix
            ));
        }

        if self.server.port == 0 {
            errors.push("server.port cannot be 0".to_string());
        } else if self.server.port < 1024 {
            warnings.push(format!(
                "server.port {} is a system/privileged port (< 1024)",
                self.server.port
            ));
        }

        if self.backup.chunk_size == 0 {
            errors.push(format!(
                "backup.chunk_size cannot be 0 (default: {})",
                constants::DOWNLOAD_CHUNK_SIZE
            ));
        }

        if self.backup.retention_hours == 0 {
            warnings.push(
                "backup.retention_hours is 0: undownloaded backups are never swept".to_string(),
            );
        }

        if self.auth.nonce_lifetime_secs < 2 {
            errors.push("auth.nonce_lifetime_secs must be at least 2".to_string());
        }

        match self.auth.admin_token.as_deref() {
            None | Some("") => warnings.push(
                "auth.admin_token is not set: all admin HTTP requests will be rejected"
                    .to_string(),
            ),
            Some(token) if token.len() < 16 => warnings.push(
                "auth.admin_token is shorter than 16 characters".to_string(),
            ),
            Some(_) => {},
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

/// Table prefixes are interpolated into SQL, so only identifier characters pass.
pub fn is_valid_table_prefix(prefix: &str) -> bool {
    prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
