//! Download file name sanitization.
//!
//! Retrieval requests name an artifact by file name only. Whatever the
//! client sends is reduced to a safe basename before it touches the file
//! system, so traversal sequences can never reach outside the backup
//! directory.

use tracing::warn;

use super::error::FileNameError;

/// Maximum accepted length of a sanitized name.
const MAX_NAME_LEN: usize = 255;

/// Reduce a requested file name to a safe basename.
///
/// - Everything up to the last `/` or `\` is dropped.
/// - Only ASCII letters, digits, `.`, `-` and `_` are kept.
/// - Leading dots, dashes and underscores are trimmed, so `..` and hidden
///   names cannot survive.
///
/// # Errors
///
/// Returns [`FileNameError`] if the input contains null bytes, is too long,
/// or nothing usable remains.
///
/// # Examples
///
/// ```
/// use commentctl::security::sanitize_file_name;
///
/// assert_eq!(
///     sanitize_file_name("comments-backup-2024-01-01-10-00-00.zip").unwrap(),
///     "comments-backup-2024-01-01-10-00-00.zip"
/// );
/// assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
/// assert!(sanitize_file_name("../..").is_err());
/// ```
pub fn sanitize_file_name(raw: &str) -> Result<String, FileNameError> {
    if raw.contains('\0') {
        warn!(
            security_event = "file_name_injection_attempt",
            file = %raw.replace('\0', "\\0"),
            reason = "null_byte",
            "Blocked file name with null byte"
        );
        return Err(FileNameError::NullByte);
    }

    let basename = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let filtered: String = basename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = filtered.trim_start_matches(['.', '-', '_']);

    if cleaned.is_empty() {
        return Err(FileNameError::EmptyName);
    }
    if cleaned.len() > MAX_NAME_LEN {
        return Err(FileNameError::TooLong);
    }

    Ok(cleaned.to_string())
}

/// Whether a raw name looked like a traversal attempt.
pub fn is_traversal_attempt(raw: &str) -> bool {
    raw.contains("..") || raw.contains('/') || raw.contains('\\')
}
