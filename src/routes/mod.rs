//! Rutas HTTP
//!
//! `create_router` monta la API `/v1`, el health check y las métricas.

pub mod admin_routes;
pub mod log_routes;
pub mod photo_routes;
pub mod stats_routes;
pub mod trig_routes;
pub mod user_routes;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::cache::metrics;
use crate::middleware::{cors_middleware, cors_middleware_with_origins};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/trigs", trig_routes::create_trig_router())
        .nest("/logs", log_routes::create_log_router())
        .nest("/photos", photo_routes::create_photo_router())
        .nest("/users", user_routes::create_user_router())
        .nest("/stats", stats_routes::create_stats_router())
        .nest("/admin", admin_routes::create_admin_router(state.clone()));

    let cors = if state.config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(&state.config.cors_origins)
    };

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .nest("/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check. Un cache caído no degrada el estado del servicio.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "cache": {
            "enabled": state.cache.is_enabled(),
            "backend": state.cache.backend(),
            "connected": state.cache.is_connected().await,
            "key_version": state.cache.key_version(),
        }
    }))
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
