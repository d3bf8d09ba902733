//! Bulk delete executor.
//!
//! Purges run one at a time within the process. The store wraps the delete
//! and the `comment_count` recount in one transaction, so a failure leaves
//! both untouched.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::audit::{AuditEvent, log_audit_event};
use crate::error::Result;
use crate::store::{CommentService, PurgeReport, StatusSelector};

/// Serializes purges over one comment store.
#[derive(Clone)]
pub struct PurgeExecutor {
    store: CommentService,
    lock: Arc<Mutex<()>>,
}

impl PurgeExecutor {
    pub fn new(store: CommentService) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Deletes every comment matching `selector` and recounts all posts.
    ///
    /// # Errors
    ///
    /// Returns the store error; the transaction is rolled back in that case.
    pub async fn execute(&self, selector: StatusSelector) -> Result<PurgeReport> {
        let _guard = self.lock.lock().await;
        info!(selector = %selector, "Purging comments");

        match self.store.purge(selector).await {
            Ok(report) => {
                log_audit_event(AuditEvent::PurgeCompleted(report.clone()));
                Ok(report)
            },
            Err(e) => {
                error!(selector = %selector, error = %e, "Comment purge failed, rolled back");
                Err(e)
            },
        }
    }
}
