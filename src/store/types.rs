//! Type definitions for the comment store.
//!
//! Contains the moderation status model, the closed purge selector, and the
//! value/row types used to export arbitrary comment columns.

use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Spam,
    Trash,
}

impl ApprovalStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 4] = [Self::Approved, Self::Pending, Self::Spam, Self::Trash];

    /// Value stored in the `comment_approved` column.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Approved => "1",
            Self::Pending => "0",
            Self::Spam => "spam",
            Self::Trash => "trash",
        }
    }

    /// Parses a `comment_approved` column value.
    ///
    /// Returns `None` for codes outside the four moderation states
    /// (e.g. `post-trashed`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Approved),
            "0" => Some(Self::Pending),
            "spam" => Some(Self::Spam),
            "trash" => Some(Self::Trash),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Spam => "spam",
            Self::Trash => "trash",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which comments a purge removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusSelector {
    Status(ApprovalStatus),
    All,
}

impl StatusSelector {
    /// Every selector, in the order the admin page offers them.
    pub const ALL: [Self; 5] = [
        Self::Status(ApprovalStatus::Approved),
        Self::Status(ApprovalStatus::Pending),
        Self::Status(ApprovalStatus::Spam),
        Self::Status(ApprovalStatus::Trash),
        Self::All,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status(status) => status.as_str(),
            Self::All => "all",
        }
    }

    /// Banner text shown after a successful purge.
    pub fn success_message(self) -> String {
        match self {
            Self::All => "All comments have been deleted successfully!".to_string(),
            Self::Status(ApprovalStatus::Trash) => {
                "All trashed comments have been deleted successfully!".to_string()
            },
            Self::Status(status) => {
                format!("All {status} comments have been deleted successfully!")
            },
        }
    }

    /// Confirmation prompt shown before a purge.
    pub fn confirmation_prompt(self) -> String {
        format!(
            "Are you sure you want to delete all {} comments? This cannot be undone.",
            self.as_str().to_uppercase()
        )
    }
}

impl fmt::Display for StatusSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusSelector {
    type Err = Error;

    /// Accepts `approved`, `pending`, `spam`, `trash`, `all`, optionally
    /// written as the form action name (`delete_spam`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_prefix("delete_").unwrap_or(trimmed);
        match name.to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Status(ApprovalStatus::Approved)),
            "pending" => Ok(Self::Status(ApprovalStatus::Pending)),
            "spam" => Ok(Self::Status(ApprovalStatus::Spam)),
            "trash" => Ok(Self::Status(ApprovalStatus::Trash)),
            "all" => Ok(Self::All),
            _ => Err(Error::InvalidSelector(s.to_string())),
        }
    }
}

impl Serialize for StatusSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the grouped count query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCountRow {
    /// Post type of the parent, `None` when the parent or its type is missing.
    pub post_type: Option<String>,
    /// Raw `comment_approved` code.
    pub status_code: String,
    pub count: u64,
}

/// Outcome of a committed purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub selector: StatusSelector,
    pub comments_deleted: usize,
    pub meta_deleted: usize,
    pub posts_recounted: usize,
}

/// SQL value as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Value {
    fn from(value_ref: ValueRef<'_>) -> Self {
        match value_ref {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) => Self::Text(String::from_utf8_lossy(t).to_string()),
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

impl Value {
    /// Plain JSON form used in backup documents. Blobs are hex encoded.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Real(r) => serde_json::Number::from_f64(*r)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Blob(b) => serde_json::Value::String(hex::encode(b)),
        }
    }
}

/// A single exported row: column names and values in query order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given columns and values.
    ///
    /// # Panics
    ///
    /// Panics if `columns.len()` != `values.len()`.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Column count ({}) must match value count ({})",
            columns.len(),
            values.len()
        );
        Self { columns, values }
    }

    /// Gets a value by column name, returning None if not found.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// JSON object keyed by column name.
    pub fn to_json_object(&self) -> serde_json::Map<String, serde_json::Value> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect()
    }
}
