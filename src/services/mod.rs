//! Servicios de la aplicación

pub mod cache_admin_service;

pub use cache_admin_service::{CacheAdminService, FlushResult};
