//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos y variables de
//! entorno. La configuración del cache vive en `cache::cache_config`.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::AppConfig;
