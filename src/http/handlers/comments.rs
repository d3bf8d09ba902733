//! Statistics page and bulk delete handlers.

use axum::{Json, extract::State, http::StatusCode};

use super::super::auth::check_nonce;
use super::super::types::{AdminPage, Notice, PageNonces, PurgeRequest};
use super::super::{AppError, SharedState};
use crate::security::NonceAction;
use crate::stats;
use crate::store::StatusSelector;

fn page_nonces(state: &SharedState) -> PageNonces {
    PageNonces {
        delete_comments: state.nonces.issue(NonceAction::DeleteComments),
        comments_backup: state.nonces.issue(NonceAction::CommentsBackup),
    }
}

async fn render(state: &SharedState, notice: Option<Notice>) -> Result<AdminPage, AppError> {
    let stats = stats::collect(&state.store).await?;
    Ok(AdminPage::new(&stats, page_nonces(state), notice))
}

/// GET /admin/comments - Statistics and delete controls.
pub(crate) async fn admin_page(
    State(state): State<SharedState>,
) -> Result<Json<AdminPage>, AppError> {
    Ok(Json(render(&state, None).await?))
}

/// POST /admin/comments/purge - Delete every comment with one status.
///
/// The page is returned either way, with a notice describing the outcome.
pub(crate) async fn purge_comments(
    State(state): State<SharedState>,
    Json(req): Json<PurgeRequest>,
) -> Result<(StatusCode, Json<AdminPage>), AppError> {
    check_nonce(
        &state,
        NonceAction::DeleteComments,
        &req.nonce,
        "/admin/comments/purge",
    )?;

    let (status, notice) = match req.status.parse::<StatusSelector>() {
        Err(e) => (StatusCode::BAD_REQUEST, Notice::error(e.user_message())),
        Ok(selector) => match state.purger.execute(selector).await {
            Ok(_) => (StatusCode::OK, Notice::success(selector.success_message())),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Notice::error(format!("Error deleting comments: {}", e.user_message())),
            ),
        },
    };

    Ok((status, Json(render(&state, Some(notice)).await?)))
}
