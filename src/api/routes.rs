//! API Routes
//!
//! Configures the Axum router with the peer endpoint and the JSON endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_handler, health_handler, not_found_handler, peer_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET {base_path}:group/:key` - Binary peer fetch, local only
/// - `GET /api/:group/:key` - JSON lookup through the full group path
/// - `GET /stats/:group` - Cache statistics of a group
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let peer_route = format!("{}:group/:key", state.base_path);

    Router::new()
        .route(&peer_route, get(peer_handler))
        .route("/api/:group/:key", get(get_handler))
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
