//! HTTP surface: classification endpoints per modality plus security
//! matrix lookups, served with axum.

pub mod error;
pub mod orchestrator;
pub mod routes;
pub mod state;
pub mod upload;

use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Request body limit applied when none is configured (uploads included).
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Router with every endpoint and the default body limit.
pub fn build_router(state: AppState) -> Router {
    build_router_with_limit(state, DEFAULT_BODY_LIMIT)
}

pub fn build_router_with_limit(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/classify", post(routes::classify::classify))
        .route("/classify/txt", post(routes::classify::classify_txt))
        .route("/classify/image", post(routes::classify::classify_image))
        .route("/classify/audio", post(routes::classify::classify_audio))
        .route("/classify/csv", post(routes::classify::classify_csv))
        .route("/security/level", post(routes::security::level))
        .route("/security/categories", get(routes::security::categories))
        .route("/security/levels", get(routes::security::levels))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve `router` until Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
