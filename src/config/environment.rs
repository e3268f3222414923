//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Ninguna variable es
//! obligatoria: los valores ausentes o inválidos caen al default con un aviso.

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
    /// Token para la superficie de admin; sin token las rutas responden 403
    pub admin_api_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            cors_origins: Vec::new(),
            admin_api_token: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            environment: non_empty("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_or("PORT", defaults.port),
            host: non_empty("HOST").unwrap_or(defaults.host),
            database_url: non_empty("DATABASE_URL"),
            cors_origins: non_empty("CORS_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            admin_api_token: non_empty("ADMIN_API_TOKEN"),
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección de escucha del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match non_empty(name) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("⚠️ {}='{}' inválido, usando {}", name, raw, default);
            default
        }),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
