//! Operaciones del store de cache
//!
//! Contrato que cumplen los backends (Redis, memoria). Los backends devuelven
//! errores tal cual; la política de degradar en silencio vive en `CacheClient`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

/// Errores del store de cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache timeout after {0} ms")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache is disabled")]
    Disabled,

    #[error("Invalid key pattern: {0}")]
    InvalidPattern(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Estadísticas del cache
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub backend: String,
    pub enabled: bool,
    pub connected: bool,
    pub key_count: u64,
    pub memory_bytes: u64,
    pub memory_human: String,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub connected_clients: u32,
    pub total_commands: u64,
}

impl CacheStats {
    /// Recalcular la tasa de aciertos a partir de hits/misses
    pub fn with_hit_rate(mut self) -> Self {
        let total = self.hits + self.misses;
        self.hit_rate = if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        };
        self
    }
}

/// Límite de tiempo y progreso de un borrado por patrón.
///
/// El contador vive fuera del futuro del borrado: si el llamador corta la
/// operación por timeout, lo ya borrado sigue contando.
#[derive(Debug)]
pub struct DeleteBudget {
    deadline: Instant,
    timeout: Duration,
    deleted: AtomicU64,
}

impl DeleteBudget {
    pub fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            timeout,
            deleted: AtomicU64::new(0),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn record(&self, count: u64) {
        self.deleted.fetch_add(count, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> u64 {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Error para un presupuesto agotado sin nada borrado
    pub fn timeout_error(&self) -> CacheError {
        CacheError::Timeout(self.timeout.as_millis() as u64)
    }
}

/// Operaciones de cache sobre valores textuales
#[async_trait]
pub trait CacheOperations: Send + Sync {
    /// Nombre corto del backend (para stats y health)
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()>;

    /// TTL restante en segundos, `None` si la clave no existe o no expira
    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>>;

    async fn delete(&self, key: &str) -> CacheResult<u64>;

    /// Eliminar todas las claves que casan con un glob, iterando con cursor.
    ///
    /// Cada lote borrado se anota en `budget`. Al vencer el plazo se para y
    /// devuelve lo borrado hasta ese momento.
    async fn delete_pattern(&self, pattern: &str, budget: &DeleteBudget) -> CacheResult<u64>;

    /// Vaciar el store completo. Devuelve cuántas claves había.
    async fn flush_all(&self) -> CacheResult<u64>;

    async fn stats(&self) -> CacheResult<CacheStats>;

    async fn ping(&self) -> CacheResult<()>;
}
