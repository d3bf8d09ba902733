//! SQLite-backed comment store.
//!
//! Works against the host's `posts` / `comments` / `commentmeta` tables,
//! named with a configurable prefix. Blocking rusqlite calls run on
//! `spawn_blocking`.

use super::backend::CommentStore;
use super::types::{PurgeReport, Row, StatusCountRow, StatusSelector, Value};
use crate::config::is_valid_table_prefix;
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior, params};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// How long a writer waits for a competing lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolved table names for one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub posts: String,
    pub comments: String,
    pub commentmeta: String,
}

impl TableNames {
    /// Builds table names from a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the prefix contains non-identifier characters.
    pub fn with_prefix(prefix: &str) -> Result<Self> {
        if !is_valid_table_prefix(prefix) {
            return Err(Error::Config(format!("invalid table prefix: '{prefix}'")));
        }
        Ok(Self {
            posts: format!("{prefix}posts"),
            comments: format!("{prefix}comments"),
            commentmeta: format!("{prefix}commentmeta"),
        })
    }
}

/// SQLite comment store.
///
/// `Clone` shares the same connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    tables: TableNames,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is invalid or the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, table_prefix: &str) -> Result<Self> {
        let tables = TableNames::with_prefix(table_prefix)?;
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            tables,
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is invalid or SQLite fails to initialize.
    pub fn memory(table_prefix: &str) -> Result<Self> {
        let tables = TableNames::with_prefix(table_prefix)?;
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            tables,
        })
    }

    /// Runs trusted SQL (schema, fixtures) directly on the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataStore`] if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    fn ensure_schema_sync(&self) -> Result<()> {
        let TableNames {
            posts,
            comments,
            commentmeta,
        } = &self.tables;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {posts} (
                ID INTEGER PRIMARY KEY,
                post_title TEXT NOT NULL DEFAULT '',
                post_type TEXT DEFAULT 'post',
                post_status TEXT NOT NULL DEFAULT 'publish',
                comment_count INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS {comments} (
                comment_ID INTEGER PRIMARY KEY,
                comment_post_ID INTEGER NOT NULL DEFAULT 0,
                comment_author TEXT NOT NULL DEFAULT '',
                comment_author_email TEXT NOT NULL DEFAULT '',
                comment_date TEXT NOT NULL DEFAULT '',
                comment_content TEXT NOT NULL DEFAULT '',
                comment_approved TEXT NOT NULL DEFAULT '1',
                comment_parent INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS {comments}_approved_post
                ON {comments} (comment_approved, comment_post_ID);
            CREATE TABLE IF NOT EXISTS {commentmeta} (
                meta_id INTEGER PRIMARY KEY,
                comment_id INTEGER NOT NULL DEFAULT 0,
                meta_key TEXT,
                meta_value TEXT
            );
            CREATE INDEX IF NOT EXISTS {commentmeta}_comment_id
                ON {commentmeta} (comment_id);"
        );
        self.conn.lock().execute_batch(&sql)?;
        Ok(())
    }

    fn count_sync(&self) -> Result<Vec<StatusCountRow>> {
        let sql = format!(
            "SELECT p.post_type, c.comment_approved, COUNT(c.comment_ID)
             FROM {comments} c
             LEFT JOIN {posts} p ON c.comment_post_ID = p.ID
             GROUP BY p.post_type, c.comment_approved
             ORDER BY p.post_type, c.comment_approved",
            comments = self.tables.comments,
            posts = self.tables.posts,
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                let count: i64 = row.get(2)?;
                Ok(StatusCountRow {
                    post_type: row.get(0)?,
                    status_code: row.get(1)?,
                    count: u64::try_from(count).unwrap_or(0),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn purge_sync(&self, selector: StatusSelector) -> Result<PurgeReport> {
        let TableNames {
            posts,
            comments,
            commentmeta,
        } = &self.tables;

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (comments_deleted, meta_deleted) = match selector {
            StatusSelector::All => {
                let comments_deleted = tx.execute(&format!("DELETE FROM {comments}"), [])?;
                let meta_deleted = tx.execute(&format!("DELETE FROM {commentmeta}"), [])?;
                (comments_deleted, meta_deleted)
            },
            StatusSelector::Status(status) => {
                let meta_deleted = tx.execute(
                    &format!(
                        "DELETE FROM {commentmeta} WHERE comment_id IN
                         (SELECT comment_ID FROM {comments} WHERE comment_approved = ?1)"
                    ),
                    params![status.code()],
                )?;
                let comments_deleted = tx.execute(
                    &format!("DELETE FROM {comments} WHERE comment_approved = ?1"),
                    params![status.code()],
                )?;
                (comments_deleted, meta_deleted)
            },
        };

        let posts_recounted = tx.execute(
            &format!(
                "UPDATE {posts} SET comment_count = (
                    SELECT COUNT(*) FROM {comments} c
                    WHERE c.comment_post_ID = {posts}.ID AND c.comment_approved = '1'
                )"
            ),
            [],
        )?;

        tx.commit()?;

        Ok(PurgeReport {
            selector,
            comments_deleted,
            meta_deleted,
            posts_recounted,
        })
    }

    fn export_sync(&self) -> Result<Vec<Row>> {
        let sql = format!(
            "SELECT c.*, m.meta_id, m.meta_key, m.meta_value
             FROM {comments} c
             LEFT JOIN {commentmeta} m ON c.comment_ID = m.comment_id
             ORDER BY c.comment_ID, m.meta_id",
            comments = self.tables.comments,
            commentmeta = self.tables.commentmeta,
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(std::string::ToString::to_string)
            .collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut query = stmt.query([])?;
        while let Some(row) = query.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(Value::from(row.get_ref(idx)?));
            }
            rows.push(Row::new(columns.clone(), values));
        }
        Ok(rows)
    }
}

#[async_trait]
impl CommentStore for SqliteStore {
    async fn ensure_schema(&self) -> Result<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.ensure_schema_sync()).await?
    }

    async fn count_by_type_and_status(&self) -> Result<Vec<StatusCountRow>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.count_sync()).await?
    }

    async fn purge(&self, selector: StatusSelector) -> Result<PurgeReport> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.purge_sync(selector)).await?
    }

    async fn export_comments(&self) -> Result<Vec<Row>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.export_sync()).await?
    }
}
