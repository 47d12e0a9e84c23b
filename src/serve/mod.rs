// src/serve/mod.rs

//! Static file serving over HTTP.
//!
//! The server is deliberately dumb: no routing beyond directory lookup, no
//! authentication, no compression negotiation. Rebuild commands write into
//! the served root while the server reads from it; nothing coordinates the
//! two, so a client may observe a partially written file mid-rebuild. That is
//! acceptable for a local development tool.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

/// Bind a TCP listener for the server.
///
/// A bind failure (e.g. port already in use) is fatal; the error is returned
/// to the caller rather than retried on another port.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;

    TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding HTTP server to {addr}"))
}

/// Build the router: every request falls through to static file lookup under
/// `root`, with `index.html` appended for directory requests.
pub fn router(root: &Path) -> Router {
    let serve_dir = ServeDir::new(root).append_index_html_on_directories(true);
    Router::new().fallback_service(serve_dir)
}

/// Serve `root` on an already-bound listener until the connection loop fails.
///
/// Never returns during normal operation.
pub async fn serve(listener: TcpListener, root: PathBuf) -> Result<()> {
    let addr = listener.local_addr().context("reading bound address")?;
    info!(root = %root.display(), "serving http://{addr}");

    let app = router(&root);
    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
