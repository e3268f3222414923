//! Middleware de CORS
//!
//! Este módulo maneja la configuración de CORS para permitir
//! requests desde diferentes orígenes.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::cache::aside::{X_CACHE, X_CACHE_AGE, X_CACHE_KEY, X_CACHE_TTL};

/// CORS permisivo para desarrollo o cuando no hay orígenes configurados
pub fn cors_middleware() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Crear middleware de CORS con orígenes específicos
pub fn cors_middleware_with_origins(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("cache-control"),
            HeaderName::from_static("pragma"),
        ])
        // El frontend lee el estado del cache
        .expose_headers([
            HeaderName::from_static(X_CACHE),
            HeaderName::from_static(X_CACHE_KEY),
            HeaderName::from_static(X_CACHE_TTL),
            HeaderName::from_static(X_CACHE_AGE),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
