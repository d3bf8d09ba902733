//! `commentctl serve`

use anyhow::{Context, Result};
use std::net::SocketAddr;

use crate::app::App;
use crate::config::Config;
use crate::http;

/// Run the admin HTTP server until Ctrl+C.
pub async fn execute(app: App, config: &Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{port}", config.server.bind)
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

    if !app.admin_token.is_configured() {
        eprintln!("Warning: auth.admin_token is not set; every admin request will be rejected.");
    }

    http::serve(app, addr).await
}
