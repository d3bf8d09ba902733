//! Backend trait for the comment store.
//!
//! Defines the data-store operations the workflow needs, so the SQLite
//! implementation can be swapped for another database or a test double.

use super::types::{PurgeReport, Row, StatusCountRow, StatusSelector};
use crate::error::Result;
use async_trait::async_trait;

/// Backend trait for comment storage.
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
///
/// # Example
///
/// ```ignore
/// use commentctl::store::{CommentStore, SqliteStore, StatusSelector};
///
/// let store = SqliteStore::memory("wp_")?;
/// store.ensure_schema().await?;
/// let report = store.purge(StatusSelector::All).await?;
/// ```
#[async_trait]
pub trait CommentStore: Send + Sync + 'static {
    /// Creates the posts, comments and commentmeta tables if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataStore`](crate::Error::DataStore) if a statement fails.
    async fn ensure_schema(&self) -> Result<()>;

    /// Comment counts grouped by parent post type and raw approval code.
    ///
    /// Comments whose parent post is missing report `post_type: None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataStore`](crate::Error::DataStore) if the query fails.
    async fn count_by_type_and_status(&self) -> Result<Vec<StatusCountRow>>;

    /// Deletes the selected comments and rewrites every post's
    /// `comment_count`, atomically.
    ///
    /// Either both phases commit or neither does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataStore`](crate::Error::DataStore) if any statement
    /// fails; the transaction is rolled back.
    async fn purge(&self, selector: StatusSelector) -> Result<PurgeReport>;

    /// Every comment left-joined with its metadata rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataStore`](crate::Error::DataStore) if the query fails.
    async fn export_comments(&self) -> Result<Vec<Row>>;
}
