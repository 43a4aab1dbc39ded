//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    dashboard::dashboard,
    profiles::{api_floats, map_figure, profile_detail, profile_figure},
    chat::{chat, search},
    system::health,
    assets::{dashboard_js, main_css},
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",       get(dashboard))
        .route("/health", get(health))

        // API endpoints
        .route("/api/floats",                 get(api_floats))
        .route("/api/figures/map",            get(map_figure))
        .route("/api/profiles/{i}",           get(profile_detail))
        .route("/api/profiles/{i}/figure",    get(profile_figure))
        .route("/api/search",                 get(search))
        .route("/api/chat",                   post(chat))

        // Static files
        .route("/static/dashboard.js", get(dashboard_js))
        .route("/static/main.css",     get(main_css))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
