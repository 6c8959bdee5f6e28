use axum::{routing::get, Router};
use health_check::health_check;
use qvix::{get_qvix_series, not_found};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod health_check;
pub mod qvix;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/{series}", get(get_qvix_series))
        .route("/health", get(health_check))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
