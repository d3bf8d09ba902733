//! HTTP API handlers organized by admin action.

pub mod backup;
pub mod comments;
pub mod health;

// Re-export all handlers for use in routing
pub(crate) use backup::{create_backup, download_backup};
pub(crate) use comments::{admin_page, purge_comments};
pub(crate) use health::health;
