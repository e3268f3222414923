//! Middleware de permisos de admin
//!
//! Compara el bearer token con `ADMIN_API_TOKEN`. Sin token configurado la
//! superficie de admin queda cerrada.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::state::AppState;
use crate::utils::errors::AppError;

pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.admin_api_token.as_deref() else {
        return Err(AppError::Forbidden("Admin API is disabled".to_string()));
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    if !token_matches(token, expected) {
        return Err(AppError::Forbidden("Token de admin inválido".to_string()));
    }

    Ok(next.run(request).await)
}

fn token_matches(token: &str, expected: &str) -> bool {
    token.trim().as_bytes().ct_eq(expected.as_bytes()).into()
}
