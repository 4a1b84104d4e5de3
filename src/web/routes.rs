//! Route configuration

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use super::handlers::{self, AppState};

/// Create the router with all pages, JSON routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // 上傳大小上限（MB → bytes）
    let body_limit = state.config.server.max_upload_mb.saturating_mul(1024 * 1024);

    let api_v1 = Router::new()
        .route("/zone", post(handlers::zone_api))
        .route("/scout", post(handlers::scout_api));

    Router::new()
        .route("/", get(handlers::index))
        .route("/zone/pincode", post(handlers::zone_from_pincode))
        .route("/zone/image", post(handlers::zone_from_image))
        .route("/scout", post(handlers::scout))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_v1)
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
}
