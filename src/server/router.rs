use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers::handle_page, state::AppState};
use crate::config::MirrorConfig;

/// Create the application router.
///
/// Every path except the health check is mirrored from the upstream origin.
pub fn create_router(config: MirrorConfig) -> anyhow::Result<Router> {
    let cors = if config.cors_allowed_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(config.cors_allowed_origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers(Any)
    };

    let state = AppState::new(config)?;

    let app = Router::new()
        .route("/_mirror/health", get(health_check))
        .fallback(handle_page)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
