//! High-level `CommentService` wrapper over store backends.

use super::backend::CommentStore;
use super::sqlite::SqliteStore;
use super::types::{PurgeReport, Row, StatusCountRow, StatusSelector};
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Shared handle to a comment store.
///
/// `CommentService` is `Clone` and can be shared across request handlers.
///
/// # Example
///
/// ```ignore
/// use commentctl::store::CommentService;
///
/// let service = CommentService::file("/srv/blog/comments.db", "wp_")?;
/// let rows = service.count_by_type_and_status().await?;
/// ```
#[derive(Clone)]
pub struct CommentService {
    backend: Arc<dyn CommentStore>,
}

impl CommentService {
    /// Creates a service backed by a SQLite database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the prefix is invalid.
    pub fn file<P: AsRef<Path>>(path: P, table_prefix: &str) -> Result<Self> {
        let backend = SqliteStore::open(path, table_prefix)?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Creates a service backed by an in-memory SQLite database.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is invalid.
    pub fn memory(table_prefix: &str) -> Result<Self> {
        let backend = SqliteStore::memory(table_prefix)?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Creates a service with a custom backend.
    pub fn custom<B: CommentStore>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates the schema if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.backend.ensure_schema().await
    }

    /// Grouped comment counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_by_type_and_status(&self) -> Result<Vec<StatusCountRow>> {
        self.backend.count_by_type_and_status().await
    }

    /// Atomic delete-and-recount.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is committed then.
    pub async fn purge(&self, selector: StatusSelector) -> Result<PurgeReport> {
        self.backend.purge(selector).await
    }

    /// All comments joined with their metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn export_comments(&self) -> Result<Vec<Row>> {
        self.backend.export_comments().await
    }
}
