//! Request and response types for the admin API.

use serde::{Deserialize, Serialize};

use crate::stats::{CommentStats, StatusCounts};
use crate::store::StatusSelector;

/// Banner shown above the admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// One statistics line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
    pub post_type: String,
    pub approved: u64,
    pub pending: u64,
    pub spam: u64,
    pub trash: u64,
    pub total: u64,
}

impl StatsRow {
    fn new(post_type: &str, counts: &StatusCounts) -> Self {
        Self {
            post_type: post_type.to_string(),
            approved: counts.approved,
            pending: counts.pending,
            spam: counts.spam,
            trash: counts.trash,
            total: counts.total(),
        }
    }
}

/// A delete control on the admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteControl {
    pub status: String,
    pub label: String,
    pub confirm: String,
}

impl From<StatusSelector> for DeleteControl {
    fn from(selector: StatusSelector) -> Self {
        let name = selector.as_str();
        let mut label = String::with_capacity(name.len() + 16);
        label.push_str("Delete ");
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            label.extend(first.to_uppercase());
            label.push_str(chars.as_str());
        }
        label.push_str(" Comments");
        Self {
            status: name.to_string(),
            label,
            confirm: selector.confirmation_prompt(),
        }
    }
}

/// Nonces the page hands out for its forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNonces {
    pub delete_comments: String,
    pub comments_backup: String,
}

/// Response of `GET /admin/comments` and `POST /admin/comments/purge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub stats: Vec<StatsRow>,
    pub totals: StatsRow,
    pub controls: Vec<DeleteControl>,
    pub nonces: PageNonces,
}

impl AdminPage {
    pub fn new(stats: &CommentStats, nonces: PageNonces, notice: Option<Notice>) -> Self {
        Self {
            notice,
            stats: stats
                .rows
                .iter()
                .map(|row| StatsRow::new(row.label(), &row.counts))
                .collect(),
            totals: StatsRow::new("Total", &stats.totals()),
            controls: StatusSelector::ALL.into_iter().map(Into::into).collect(),
            nonces,
        }
    }
}

/// Body of `POST /admin/comments/purge`.
#[derive(Debug, Clone, Deserialize)]
pub struct PurgeRequest {
    pub status: String,
    #[serde(default)]
    pub nonce: String,
}

/// Body of `POST /admin/comments/backup`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupRequest {
    #[serde(default)]
    pub nonce: String,
}

/// Created backup, as returned to the page script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupCreated {
    pub file: String,
    pub download_url: String,
    pub message: String,
}

/// Failure payload of the backup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupFailed {
    pub message: String,
}

/// `{"success": bool, "data": ...}` envelope of the backup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }

    pub fn failure(data: T) -> Self {
        Self {
            success: false,
            data,
        }
    }
}

/// Query of `GET /admin/comments/backup/download`.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use crate::store::{ApprovalStatus, StatusCountRow};

    #[test]
    fn test_delete_control_labels() {
        let spam: DeleteControl = StatusSelector::Status(ApprovalStatus::Spam).into();
        assert_eq!(spam.label, "Delete Spam Comments");
        assert_eq!(spam.status, "spam");
        assert_eq!(
            spam.confirm,
            "Are you sure you want to delete all SPAM comments? This cannot be undone."
        );
        let all: DeleteControl = StatusSelector::All.into();
        assert_eq!(all.label, "Delete All Comments");
    }

    #[test]
    fn test_page_lists_rows_and_controls() {
        let stats = aggregate(&[StatusCountRow {
            post_type: Some("post".into()),
            status_code: "1".into(),
            count: 3,
        }]);
        let nonces = PageNonces {
            delete_comments: "d".into(),
            comments_backup: "b".into(),
        };
        let page = AdminPage::new(&stats, nonces, Some(Notice::success("ok")));
        assert_eq!(page.stats.len(), 1);
        assert_eq!(page.stats[0].total, 3);
        assert_eq!(page.totals.approved, 3);
        assert_eq!(page.controls.len(), 5);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["notice"]["kind"], "success");
    }
}
