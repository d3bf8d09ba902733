//! Comment store with pluggable backends.
//!
//! Reads grouped counts and exports, and performs the atomic
//! delete-then-recount purge against the host's comment tables.
//!
//! # Example
//!
//! ```ignore
//! use commentctl::store::{CommentService, StatusSelector};
//!
//! let service = CommentService::file("comments.db", "wp_")?;
//! service.ensure_schema().await?;
//! let report = service.purge("spam".parse::<StatusSelector>()?).await?;
//! println!("{} comments removed", report.comments_deleted);
//! ```
//!
//! # Custom Backends
//!
//! Implement [`CommentStore`] and wrap it with [`CommentService::custom`].

mod backend;
mod service;
mod sqlite;
mod types;

pub use backend::CommentStore;
pub use service::CommentService;
pub use sqlite::{SqliteStore, TableNames};
pub use types::{
    ApprovalStatus, PurgeReport, Row, StatusCountRow, StatusSelector, Value,
};
