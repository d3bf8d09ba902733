//! Admin capability middleware and nonce checks.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;

use super::{AppError, SharedState};
use crate::audit::{AuditEvent, log_audit_event};
use crate::error::{AuthFailure, Error};
use crate::security::NonceAction;

/// Token after a case-insensitive `Bearer ` scheme.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(v[7..].trim())
            } else {
                None
            }
        })
}

/// Rejects requests without the admin token.
pub(crate) async fn require_admin(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let failure = match extract_bearer_token(&req) {
        None => Some(AuthFailure::MissingToken),
        Some(token) if !state.admin_token.verify(token) => Some(AuthFailure::InvalidToken),
        Some(_) => None,
    };

    if let Some(failure) = failure {
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);
        log_audit_event(AuditEvent::AuthFailure {
            remote_addr,
            path: req.uri().path().to_string(),
            reason: failure.to_string(),
        });
        return Err(Error::Authorization(failure).into());
    }

    Ok(next.run(req).await)
}

/// Verifies an anti-forgery nonce for `action`.
pub(crate) fn check_nonce(
    state: &SharedState,
    action: NonceAction,
    nonce: &str,
    path: &str,
) -> Result<(), AppError> {
    if state.nonces.verify(action, nonce) {
        return Ok(());
    }
    log_audit_event(AuditEvent::NonceRejected {
        action: action.as_str(),
        path: path.to_string(),
    });
    Err(Error::Authorization(AuthFailure::NonceRejected).into())
}
