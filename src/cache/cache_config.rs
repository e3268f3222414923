//! Configuración de cache
//!
//! Este módulo contiene la configuración para el sistema de cache. Nada de lo
//! que se lee aquí puede impedir el arranque: una URL ausente o inválida deja
//! el cache deshabilitado.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::keys::DEFAULT_KEY_VERSION;

/// Backend de cache a utilizar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub enabled: bool,
    pub backend: CacheBackend,
    /// Timeout de operaciones individuales (get/set/del/ttl)
    pub op_timeout: Duration,
    /// Timeout de operaciones masivas (delete_pattern, flush, stats)
    pub bulk_timeout: Duration,
    pub key_version: String,
    /// Tamaño de página para SCAN
    pub scan_count: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            enabled: true,
            backend: CacheBackend::Redis,
            op_timeout: Duration::from_millis(2000),
            bulk_timeout: Duration::from_secs(10),
            key_version: DEFAULT_KEY_VERSION.to_string(),
            scan_count: 100,
        }
    }
}

impl CacheConfig {
    /// Leer configuración desde variables de entorno
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let redis_url = env::var("REDIS_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let enabled = match env::var("CACHE_ENABLED") {
            Ok(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warn!("⚠️ CACHE_ENABLED inválido ({}), usando true", raw);
                true
            }),
            Err(_) => defaults.enabled,
        };

        let backend = match env::var("CACHE_BACKEND").as_deref() {
            Ok("memory") => CacheBackend::Memory,
            Ok("redis") | Err(_) => CacheBackend::Redis,
            Ok(other) => {
                warn!("⚠️ CACHE_BACKEND desconocido ({}), usando redis", other);
                CacheBackend::Redis
            }
        };

        let op_timeout = env_millis("CACHE_OP_TIMEOUT_MS").unwrap_or(defaults.op_timeout);
        let bulk_timeout = env_millis("CACHE_BULK_TIMEOUT_MS").unwrap_or(defaults.bulk_timeout);

        let key_version = env::var("CACHE_KEY_VERSION")
            .ok()
            .filter(|v| is_valid_version(v))
            .unwrap_or(defaults.key_version);

        Self {
            redis_url,
            enabled,
            backend,
            op_timeout,
            bulk_timeout,
            key_version,
            scan_count: defaults.scan_count,
        }
    }

    /// Configuración para tests: backend en memoria, timeouts cortos
    pub fn memory() -> Self {
        Self {
            backend: CacheBackend::Memory,
            op_timeout: Duration::from_millis(500),
            bulk_timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => {
            warn!("⚠️ {} inválido ({}), usando valor por defecto", name, raw);
            None
        }
    }
}

/// La versión forma parte de la clave: sin ':' ni comodines
fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}
