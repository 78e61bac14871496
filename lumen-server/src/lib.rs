pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scan/start", post(routes::start_scan))
        .route("/scan/status", get(routes::scan_status))
        .route("/scan/result", get(routes::scan_result))
        .route("/scan/cancel", post(routes::cancel_scan))
        .route("/download-csv", get(routes::download_csv))
        .route("/download-html", get(routes::download_html))
        .route("/log-buffer", get(routes::log_buffer))
        .route("/check", post(routes::check))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Lumen API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
