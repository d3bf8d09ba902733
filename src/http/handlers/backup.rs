//! Backup creation and one-time download handlers.

use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use super::super::auth::check_nonce;
use super::super::types::{BackupCreated, BackupFailed, BackupRequest, DownloadQuery, Envelope};
use super::super::{AppError, SharedState};
use crate::app::DOWNLOAD_PATH;
use crate::backup::{ArtifactHeaders, BackupOutcome, ChannelSink, deliver, open_artifact};
use crate::security::NonceAction;

/// Chunks buffered between the reader task and the response body.
const BODY_CHANNEL_CAPACITY: usize = 2;

/// POST /admin/comments/backup - Create a backup and return its download link.
pub(crate) async fn create_backup(
    State(state): State<SharedState>,
    Json(req): Json<BackupRequest>,
) -> Result<Response, AppError> {
    check_nonce(
        &state,
        NonceAction::CommentsBackup,
        &req.nonce,
        "/admin/comments/backup",
    )?;

    // Failures travel in the envelope; the transport status stays 200.
    let response = match BackupOutcome::from(state.generator.generate().await) {
        BackupOutcome::Created(artifact) => {
            info!(file = %artifact.file, "Backup ready for download");
            let download_url = state.download_url(&artifact.file);
            Json(Envelope::success(BackupCreated {
                file: artifact.file,
                download_url,
                message: "Backup created successfully".to_string(),
            }))
            .into_response()
        },
        BackupOutcome::Failed { message } => {
            Json(Envelope::failure(BackupFailed { message })).into_response()
        },
    };
    Ok(response)
}

/// GET /admin/comments/backup/download - Stream an artifact, then delete it.
///
/// The artifact is opened before any header is sent, so a missing file is a
/// plain 404. Bytes flow through a channel fed by a spawned task, which
/// deletes the artifact only after the body has yielded its last byte. A
/// body dropped earlier leaves the artifact in place.
pub(crate) async fn download_backup(
    State(state): State<SharedState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    check_nonce(&state, NonceAction::DownloadBackup, &query.nonce, DOWNLOAD_PATH)?;

    let artifact = open_artifact(state.backup_dir(), &query.file).await?;
    let headers = artifact.headers().clone();

    let (mut sink, body) = ChannelSink::channel(BODY_CHANNEL_CAPACITY, headers.content_length);
    let chunk_size = state.chunk_size();
    tokio::spawn(async move {
        if let Err(e) = deliver(artifact, &mut sink, chunk_size).await {
            error!(error = %e, "Backup download failed");
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, ArtifactHeaders::CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, headers.content_length)
        .header(header::CONTENT_DISPOSITION, headers.content_disposition())
        .header(header::CACHE_CONTROL, ArtifactHeaders::CACHE_CONTROL)
        .header(header::PRAGMA, "no-cache")
        .header(header::EXPIRES, "0")
        .body(Body::from_stream(body))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
