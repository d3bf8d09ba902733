//! Security audit logging for admin actions.
//!
//! Provides structured audit logging for security-relevant events like
//! authentication failures, rejected nonces, traversal attempts, and the
//! destructive operations themselves.

use std::net::SocketAddr;
use tracing::{info, warn};

use crate::store::PurgeReport;

/// Security audit events that should be logged for monitoring and alerting.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Missing or wrong admin token
    AuthFailure {
        remote_addr: Option<SocketAddr>,
        path: String,
        reason: String,
    },
    /// Anti-forgery nonce missing, expired or for another action
    NonceRejected { action: &'static str, path: String },
    /// Download name contained traversal sequences
    PathTraversalBlocked { requested: String, sanitized: String },
    /// Bulk delete committed
    PurgeCompleted(PurgeReport),
    /// Backup archive written
    BackupCreated { file: String, bytes: u64 },
    /// Artifact fully streamed and removed
    DownloadCompleted { file: String, bytes: u64 },
    /// Client went away mid-stream; artifact kept
    DownloadAborted { file: String, bytes_sent: u64 },
}

/// Log a security audit event with structured fields.
pub fn log_audit_event(event: AuditEvent) {
    match event {
        AuditEvent::AuthFailure {
            remote_addr,
            path,
            reason,
        } => {
            let remote_addr = remote_addr.map_or_else(|| "unknown".to_string(), |a| a.to_string());
            warn!(
                target: "audit",
                event_type = "auth_failure",
                %remote_addr,
                %path,
                %reason,
                "Authentication failed"
            );
        },
        AuditEvent::NonceRejected { action, path } => {
            warn!(
                target: "audit",
                event_type = "nonce_rejected",
                action,
                %path,
                "Security check failed"
            );
        },
        AuditEvent::PathTraversalBlocked {
            requested,
            sanitized,
        } => {
            warn!(
                target: "audit",
                event_type = "path_traversal_blocked",
                %requested,
                %sanitized,
                "Path traversal attempt blocked"
            );
        },
        AuditEvent::PurgeCompleted(report) => {
            info!(
                target: "audit",
                event_type = "purge_completed",
                selector = %report.selector,
                comments_deleted = report.comments_deleted,
                meta_deleted = report.meta_deleted,
                posts_recounted = report.posts_recounted,
                "Comments purged"
            );
        },
        AuditEvent::BackupCreated { file, bytes } => {
            info!(
                target: "audit",
                event_type = "backup_created",
                %file,
                bytes,
                "Backup created"
            );
        },
        AuditEvent::DownloadCompleted { file, bytes } => {
            info!(
                target: "audit",
                event_type = "download_completed",
                %file,
                bytes,
                "Backup downloaded and removed"
            );
        },
        AuditEvent::DownloadAborted { file, bytes_sent } => {
            warn!(
                target: "audit",
                event_type = "download_aborted",
                %file,
                bytes_sent,
                "Backup download aborted by client, file kept"
            );
        },
    }
}
