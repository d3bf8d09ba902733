//! Admin HTTP surface.
//!
//! Exposes the statistics page, bulk delete, backup creation and the
//! one-time backup download over a small JSON API:
//!
//! - `GET  /admin/comments` - statistics and delete controls
//! - `POST /admin/comments/purge` - delete one status (or all)
//! - `POST /admin/comments/backup` - create a backup archive
//! - `GET  /admin/comments/backup/download` - stream and delete an archive
//! - `GET  /health` - unauthenticated liveness
//!
//! Every `/admin` route requires `Authorization: Bearer <admin token>`;
//! mutating routes additionally require an action nonce.

mod auth;
mod error;
mod handlers;
pub mod types;

use anyhow::{Context, Result};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::app::{App, DOWNLOAD_PATH};

pub use error::{AppError, ErrorResponse};

/// State shared by every handler.
pub type SharedState = Arc<App>;

/// Builds the router over `app`.
pub fn router(app: App) -> Router {
    let state: SharedState = Arc::new(app);

    let admin = Router::new()
        .route("/admin/comments", get(handlers::admin_page))
        .route("/admin/comments/purge", post(handlers::purge_comments))
        .route("/admin/comments/backup", post(handlers::create_backup))
        .route(DOWNLOAD_PATH, get(handlers::download_backup))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(admin)
        .with_state(state)
}

/// Serves the admin API until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(app: App, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local = listener.local_addr().unwrap_or(addr);
    info!(addr = %local, "Admin server listening");

    axum::serve(
        listener,
        router(app).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Admin server failed")?;

    info!("Admin server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
