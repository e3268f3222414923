//! Middleware del sistema
//!
//! Permisos de admin y CORS.

pub mod admin;
pub mod cors;

pub use admin::require_admin;
pub use cors::{cors_middleware, cors_middleware_with_origins};
