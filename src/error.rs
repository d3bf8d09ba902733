//! Error types for the comment workflow.
//!
//! Every failure the statistics, purge and backup paths can hit is one
//! variant of [`Error`]. The `Display` output carries full detail for logs;
//! [`Error::user_message`] is the short text that may be shown to a client.

use std::fmt;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// File system steps a backup or download can fail at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsStep {
    CreateDirectory,
    WritePlaceholder,
    WriteJson,
    ReadArtifact,
    WriteOutput,
    RemoveFile,
    ScanDirectory,
}

impl fmt::Display for FsStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::CreateDirectory => "Failed to create backup directory",
            Self::WritePlaceholder => "Failed to write directory placeholder",
            Self::WriteJson => "Failed to write JSON file. Check permissions and disk space.",
            Self::ReadArtifact => "Failed to read backup file",
            Self::WriteOutput => "Failed to write download output",
            Self::RemoveFile => "Failed to remove file",
            Self::ScanDirectory => "Failed to scan backup directory",
        };
        f.write_str(msg)
    }
}

/// Archive steps a backup can fail at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStep {
    Create,
    AddEntry,
    Finish,
}

impl fmt::Display for ArchiveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Create => "Failed to create ZIP file",
            Self::AddEntry => "Failed to add JSON file to ZIP archive",
            Self::Finish => "Failed to finalize ZIP archive",
        };
        f.write_str(msg)
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
    NonceRejected,
}

impl AuthFailure {
    /// Whether the caller lacks the admin capability itself.
    pub fn is_unauthenticated(self) -> bool {
        matches!(self, Self::MissingToken | Self::InvalidToken)
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingToken => "missing bearer token",
            Self::InvalidToken => "invalid token",
            Self::NonceRejected => "nonce rejected",
        };
        f.write_str(msg)
    }
}

/// Workflow errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid capability / anti-forgery proof.
    #[error("authorization failed: {0}")]
    Authorization(AuthFailure),

    /// No archive writer is available in this build.
    #[error("compression unavailable: {0}")]
    CompressionUnavailable(String),

    /// Query, delete or update failure in the comment store.
    #[error("database error: {0}")]
    DataStore(String),

    /// Directory, write, read or delete failure.
    #[error("{step}: {source}")]
    FileSystem {
        step: FsStep,
        #[source]
        source: std::io::Error,
    },

    /// Archive creation or entry-add failure.
    #[error("{step}: {reason}")]
    Archive { step: ArchiveStep, reason: String },

    /// Requested backup artifact does not exist or cannot be read.
    #[error("not found: {0}")]
    NotFound(String),

    /// The download client went away between chunks.
    #[error("client disconnected")]
    ClientDisconnect,

    /// Unknown status selector.
    #[error("invalid status selector: {0}")]
    InvalidSelector(String),

    /// Backup document could not be encoded.
    #[error("JSON encoding error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Wraps an I/O error with the step that produced it.
    pub fn fs(step: FsStep, source: std::io::Error) -> Self {
        Self::FileSystem { step, source }
    }

    /// Wraps an archive failure with the step that produced it.
    pub fn archive(step: ArchiveStep, reason: impl fmt::Display) -> Self {
        Self::Archive {
            step,
            reason: reason.to_string(),
        }
    }

    /// Short message safe to return to a client.
    ///
    /// Names the failing step but never includes OS error strings, SQL text
    /// or file system paths.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authorization(AuthFailure::NonceRejected) => "Security check failed".into(),
            Self::Authorization(_) => {
                "You do not have sufficient permissions to access this page.".into()
            },
            Self::CompressionUnavailable(_) => {
                "ZIP compression is not available on this server".into()
            },
            Self::DataStore(_) => "Database error".into(),
            Self::FileSystem { step, .. } => step.to_string(),
            Self::Archive { step, .. } => step.to_string(),
            Self::NotFound(_) => "File not found or not readable.".into(),
            Self::ClientDisconnect => "Client disconnected".into(),
            Self::InvalidSelector(s) => format!("Unknown comment status '{s}'"),
            Self::Serialization(_) => "JSON encoding error".into(),
            Self::Config(msg) => msg.clone(),
            Self::Task(_) => "Internal error".into(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::DataStore(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_io_detail() {
        let err = Error::fs(
            FsStep::WriteJson,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/secret denied"),
        );
        assert!(err.to_string().contains("/srv/secret"));
        assert!(!err.user_message().contains("/srv/secret"));
        assert!(err.user_message().starts_with("Failed to write JSON file"));
    }

    #[test]
    fn test_archive_error_names_step() {
        let err = Error::archive(ArchiveStep::AddEntry, "disk full");
        assert_eq!(
            err.user_message(),
            "Failed to add JSON file to ZIP archive"
        );
        assert_eq!(
            err.to_string(),
            "Failed to add JSON file to ZIP archive: disk full"
        );
    }

    #[test]
    fn test_authorization_messages() {
        let missing = Error::Authorization(AuthFailure::MissingToken);
        assert_eq!(missing.to_string(), "authorization failed: missing bearer token");
        assert!(missing.user_message().starts_with("You do not have sufficient permissions"));
        assert_eq!(
            Error::Authorization(AuthFailure::NonceRejected).user_message(),
            "Security check failed"
        );
    }

    #[test]
    fn test_rusqlite_error_maps_to_data_store() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::DataStore(_)));
        assert_eq!(err.user_message(), "Database error");
    }
}
