//! Comment statistics by post type and moderation status.
//!
//! [`aggregate`] folds the grouped count rows into one line per post type
//! with a four-way split and a total. Nothing is cached: every view
//! recomputes from the store.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::Result;
use crate::store::{ApprovalStatus, CommentService, StatusCountRow};

/// Label for comments whose parent has no post type.
pub const NO_POST_TYPE: &str = "No post type";

/// Per-status comment counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub approved: u64,
    pub pending: u64,
    pub spam: u64,
    pub trash: u64,
}

impl StatusCounts {
    pub fn get(&self, status: ApprovalStatus) -> u64 {
        match status {
            ApprovalStatus::Approved => self.approved,
            ApprovalStatus::Pending => self.pending,
            ApprovalStatus::Spam => self.spam,
            ApprovalStatus::Trash => self.trash,
        }
    }

    fn add(&mut self, status: ApprovalStatus, count: u64) {
        let slot = match status {
            ApprovalStatus::Approved => &mut self.approved,
            ApprovalStatus::Pending => &mut self.pending,
            ApprovalStatus::Spam => &mut self.spam,
            ApprovalStatus::Trash => &mut self.trash,
        };
        *slot += count;
    }

    pub fn total(&self) -> u64 {
        self.approved + self.pending + self.spam + self.trash
    }
}

/// One table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTypeStats {
    /// `None` is the "No post type" bucket.
    pub post_type: Option<String>,
    pub counts: StatusCounts,
}

impl PostTypeStats {
    pub fn label(&self) -> &str {
        self.post_type.as_deref().unwrap_or(NO_POST_TYPE)
    }
}

/// Aggregated statistics, ordered by post type with the unnamed bucket first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentStats {
    pub rows: Vec<PostTypeStats>,
}

impl CommentStats {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column sums across every post type.
    pub fn totals(&self) -> StatusCounts {
        let mut totals = StatusCounts::default();
        for row in &self.rows {
            for status in ApprovalStatus::ALL {
                totals.add(status, row.counts.get(status));
            }
        }
        totals
    }

    pub fn for_post_type(&self, post_type: Option<&str>) -> Option<&StatusCounts> {
        self.rows
            .iter()
            .find(|row| row.post_type.as_deref() == post_type)
            .map(|row| &row.counts)
    }
}

/// Folds grouped count rows into per-post-type statistics.
///
/// Missing and empty post types share the [`NO_POST_TYPE`] bucket. Rows
/// whose status code is not one of the four moderation states still
/// create their post type's line but add nothing to it.
pub fn aggregate(rows: &[StatusCountRow]) -> CommentStats {
    let mut by_type: BTreeMap<Option<String>, StatusCounts> = BTreeMap::new();

    for row in rows {
        let key = row.post_type.clone().filter(|t| !t.is_empty());
        let counts = by_type.entry(key).or_default();
        match ApprovalStatus::from_code(&row.status_code) {
            Some(status) => counts.add(status, row.count),
            None => debug!(
                status_code = %row.status_code,
                count = row.count,
                "Ignoring comments with unrecognized approval code"
            ),
        }
    }

    CommentStats {
        rows: by_type
            .into_iter()
            .map(|(post_type, counts)| PostTypeStats { post_type, counts })
            .collect(),
    }
}

/// Reads the grouped counts and aggregates them.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub async fn collect(store: &CommentService) -> Result<CommentStats> {
    let rows = store.count_by_type_and_status().await?;
    Ok(aggregate(&rows))
}

impl fmt::Display for CommentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.label().len())
            .chain(std::iter::once("Post Type".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
            "Post Type", "Approved", "Pending", "Spam", "Trash", "Total"
        )?;
        writeln!(f, "{}", "-".repeat(width + 50))?;

        if self.rows.is_empty() {
            return writeln!(f, "(no comments)");
        }

        for row in &self.rows {
            let c = &row.counts;
            writeln!(
                f,
                "{:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
                row.label(),
                c.approved,
                c.pending,
                c.spam,
                c.trash,
                c.total()
            )?;
        }
        Ok(())
    }
}
