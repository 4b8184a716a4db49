pub mod config;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(routes::analyze))
        .route("/health", get(routes::health_check))
        .route("/stats", get(routes::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
