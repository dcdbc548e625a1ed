//! JSON API over the prediction pipeline (`http` feature).
//!
//! Uploads are classified on tokio's blocking pool so decode, feature
//! extraction and inference never stall the async workers.

mod routes;

pub use routes::{build_router, run_http_server, HttpServerError, HttpState};

use std::net::SocketAddr;

use anyhow::Context;

use crate::context::AppContext;

/// Default bind address for `serve`
pub const DEFAULT_ADDR: &str = "127.0.0.1:8787";

/// Run the server on a fresh multi-threaded runtime until it stops
pub fn serve_blocking(ctx: &'static AppContext, addr: SocketAddr) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime for HTTP server")?;

    log::info!("[Http] Listening on {}", addr);
    runtime.block_on(run_http_server(HttpState::new(ctx), addr))
}
