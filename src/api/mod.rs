//! REST API over a computed yield report.
//!
//! Provides three endpoints:
//! - `GET /summary`: fleet totals and the engine configuration
//! - `GET /turbines`: per-turbine results with optional wake-loss filtering
//! - `POST /compute`: computes a posted project document on demand

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::EngineConfig;
use crate::report::YieldReport;

pub use types::{ErrorResponse, SummaryResponse, TurbineQuery};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the initial run completes and wrapped in
/// `Arc`; no locks needed since all data is read-only.
pub struct AppState {
    /// Configuration used for the initial run and for `/compute`.
    pub config: EngineConfig,
    /// Report of the initial run.
    pub report: YieldReport,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/turbines", get(handlers::get_turbines))
        .route("/compute", post(handlers::post_compute))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
