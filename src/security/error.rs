//! Error types for security validation.

use std::error::Error;
use std::fmt;

/// Error type for rejected backup file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNameError {
    /// Name is empty, or nothing survived sanitization.
    EmptyName,
    /// Name contains null bytes.
    NullByte,
    /// Name is too long (> 255 characters).
    TooLong,
}

impl fmt::Display for FileNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "File name is empty"),
            Self::NullByte => write!(f, "File name contains null bytes"),
            Self::TooLong => write!(f, "File name is too long (max 255 characters)"),
        }
    }
}

impl Error for FileNameError {}
