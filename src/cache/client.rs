//! Adaptador del store de cache
//!
//! `CacheClient` es el único punto por el que el resto de la aplicación habla
//! con el store. Aplica el timeout a cada operación y absorbe cualquier fallo:
//! una lectura fallida es un miss, una escritura fallida es un no-op. Las
//! variantes `try_*` propagan el error y solo las usa la superficie de admin.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::cache_config::{CacheBackend, CacheConfig};
use super::keys::CacheKey;
use super::memory_store::MemoryStore;
use super::metrics::CACHE_ERRORS;
use super::operations::{CacheError, CacheOperations, CacheResult, CacheStats, DeleteBudget};
use super::redis_client::RedisClient;
use super::resources::ResourceType;

/// Valor almacenado junto con el instante en que se escribió
#[derive(Debug, Serialize, Deserialize)]
struct StoredEnvelope {
    /// Milisegundos desde epoch
    cached_at: i64,
    body: String,
}

/// Resultado de una lectura con acierto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub value: String,
    pub age_seconds: u64,
}

#[derive(Clone)]
pub struct CacheClient {
    store: Option<Arc<dyn CacheOperations>>,
    enabled: bool,
    op_timeout: Duration,
    bulk_timeout: Duration,
    key_version: String,
}

impl CacheClient {
    /// Construir el cliente a partir de la configuración.
    ///
    /// Nunca falla. Sin URL o con URL inválida el cliente queda deshabilitado
    /// de forma permanente; con Redis inalcanzable arranca igualmente y cada
    /// operación intenta conectar.
    pub async fn connect(config: CacheConfig) -> Self {
        if !config.enabled {
            info!(event = "cache_disabled", "⏸️ Cache deshabilitado por configuración");
            return Self::without_store(&config);
        }

        let store: Arc<dyn CacheOperations> = match config.backend {
            CacheBackend::Memory => {
                info!("🧠 Usando cache en memoria");
                Arc::new(MemoryStore::new())
            }
            CacheBackend::Redis => {
                let Some(url) = config.redis_url.as_deref() else {
                    warn!(event = "cache_disabled", "⚠️ REDIS_URL no configurada, cache deshabilitado");
                    return Self::without_store(&config);
                };

                // Solo una URL inválida deshabilita el cache. Un Redis caído
                // degrada cada llamada y se reintenta en la siguiente.
                let client = match RedisClient::new(url, config.scan_count) {
                    Ok(client) => client,
                    Err(e) => {
                        warn!(event = "cache_disabled", error = %e, "⚠️ REDIS_URL inválida, cache deshabilitado");
                        return Self::without_store(&config);
                    }
                };

                match tokio::time::timeout(config.op_timeout, client.ping()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!(event = "cache_degraded", error = %e, "⚠️ Redis no disponible al arrancar, se reintentará");
                    }
                    Err(_) => {
                        warn!(event = "cache_degraded", "⚠️ Timeout conectando a Redis, se reintentará");
                    }
                }
                Arc::new(client)
            }
        };

        Self::with_store(store, &config)
    }

    /// Cliente sobre un store ya construido (tests, composición manual)
    pub fn with_store(store: Arc<dyn CacheOperations>, config: &CacheConfig) -> Self {
        Self {
            store: Some(store),
            enabled: config.enabled,
            op_timeout: config.op_timeout,
            bulk_timeout: config.bulk_timeout,
            key_version: config.key_version.clone(),
        }
    }

    /// Cliente sin store: todas las operaciones son miss / no-op
    pub fn disabled() -> Self {
        Self::without_store(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    fn without_store(config: &CacheConfig) -> Self {
        Self {
            store: None,
            enabled: false,
            op_timeout: config.op_timeout,
            bulk_timeout: config.bulk_timeout,
            key_version: config.key_version.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.store.is_some()
    }

    pub fn backend(&self) -> &'static str {
        match &self.store {
            Some(store) if self.enabled => store.backend(),
            _ => "disabled",
        }
    }

    pub fn key_version(&self) -> &str {
        &self.key_version
    }

    /// Constructor de claves con la versión configurada
    pub fn key(&self, resource: ResourceType) -> CacheKey {
        CacheKey::new(resource).version(&self.key_version)
    }

    fn store(&self) -> CacheResult<&Arc<dyn CacheOperations>> {
        match &self.store {
            Some(store) if self.enabled => Ok(store),
            _ => Err(CacheError::Disabled),
        }
    }

    async fn timed<T, F>(&self, timeout: Duration, operation: F) -> CacheResult<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        match tokio::time::timeout(timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(timeout.as_millis() as u64)),
        }
    }

    /// Registrar un fallo absorbido
    fn degraded(&self, operation: &'static str, key: &str, error: &CacheError) {
        if matches!(error, CacheError::Disabled) {
            return;
        }
        CACHE_ERRORS.with_label_values(&[operation]).inc();
        let event = match error {
            CacheError::Timeout(_) => "cache_timeout",
            _ => "cache_store_error",
        };
        warn!(event = event, operation = operation, key = key, error = %error, "⚠️ Cache degradado");
    }

    /// Leer un valor y su antigüedad. Cualquier fallo es un miss.
    pub async fn get(&self, key: &str) -> Option<CacheHit> {
        let store = self.store().ok()?;

        let raw = match self.timed(self.op_timeout, store.get(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(event = "cache_miss", key = key, "❌ Cache MISS");
                return None;
            }
            Err(e) => {
                self.degraded("get", key, &e);
                return None;
            }
        };

        match serde_json::from_str::<StoredEnvelope>(&raw) {
            Ok(envelope) => {
                let age_ms = (Utc::now().timestamp_millis() - envelope.cached_at).max(0);
                debug!(event = "cache_hit", key = key, "📥 Cache HIT");
                Some(CacheHit {
                    value: envelope.body,
                    age_seconds: (age_ms / 1000) as u64,
                })
            }
            Err(e) => {
                warn!(event = "cache_decode_error", key = key, error = %e, "⚠️ Entrada de cache ilegible, tratada como miss");
                None
            }
        }
    }

    /// Guardar un valor con TTL. Devuelve si quedó almacenado.
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> bool {
        let Ok(store) = self.store() else {
            return false;
        };

        let envelope = StoredEnvelope {
            cached_at: Utc::now().timestamp_millis(),
            body: value.to_string(),
        };
        let raw = match serde_json::to_string(&envelope) {
            Ok(raw) => raw,
            Err(e) => {
                self.degraded("set", key, &CacheError::from(e));
                return false;
            }
        };

        match self.timed(self.op_timeout, store.set_ex(key, &raw, ttl_seconds)).await {
            Ok(()) => {
                debug!(key = key, ttl = ttl_seconds, "💾 Cache SET");
                true
            }
            Err(e) => {
                self.degraded("set", key, &e);
                false
            }
        }
    }

    pub async fn ttl(&self, key: &str) -> Option<u64> {
        let store = self.store().ok()?;
        match self.timed(self.op_timeout, store.ttl(key)).await {
            Ok(ttl) => ttl,
            Err(e) => {
                self.degraded("ttl", key, &e);
                None
            }
        }
    }

    pub async fn delete(&self, key: &str) -> u64 {
        let Ok(store) = self.store() else {
            return 0;
        };
        match self.timed(self.op_timeout, store.delete(key)).await {
            Ok(count) => {
                debug!(event = "cache_delete", key = key, deleted = count, "🗑️ Cache DELETE");
                count
            }
            Err(e) => {
                self.degraded("delete", key, &e);
                0
            }
        }
    }

    /// Borrado por patrón tolerante a fallos: devuelve lo que se borró
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        match self.try_delete_pattern(pattern).await {
            Ok(count) => count,
            Err(e) => {
                self.degraded("delete_pattern", pattern, &e);
                0
            }
        }
    }

    /// Stats best-effort: valores vacíos si el store no responde
    pub async fn stats(&self) -> CacheStats {
        match self.try_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                self.degraded("stats", "", &e);
                CacheStats {
                    backend: self.backend().to_string(),
                    enabled: self.is_enabled(),
                    ..Default::default()
                }
            }
        }
    }

    pub async fn is_connected(&self) -> bool {
        match self.store() {
            Ok(store) => self.timed(self.op_timeout, store.ping()).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Borrado por patrón con plazo `bulk_timeout`. Si el plazo vence o el
    /// store falla a mitad, devuelve lo que llegó a borrarse.
    pub async fn try_delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let store = self.store()?;
        let budget = DeleteBudget::new(self.bulk_timeout);

        let count = match tokio::time::timeout_at(
            budget.deadline(),
            store.delete_pattern(pattern, &budget),
        )
        .await
        {
            Ok(Ok(count)) => count,
            Ok(Err(e)) if budget.deleted() == 0 => return Err(e),
            Ok(Err(e)) => {
                warn!(event = "cache_delete_partial", pattern = pattern, deleted = budget.deleted(), error = %e, "⚠️ Borrado por patrón parcial");
                budget.deleted()
            }
            Err(_) if budget.deleted() == 0 => return Err(budget.timeout_error()),
            Err(_) => {
                warn!(event = "cache_delete_partial", pattern = pattern, deleted = budget.deleted(), "⏱️ Borrado por patrón cortado por timeout");
                budget.deleted()
            }
        };

        debug!(event = "cache_delete_pattern", pattern = pattern, deleted = count, "🗑️ Cache DELETE por patrón");
        Ok(count)
    }

    pub async fn try_flush_all(&self) -> CacheResult<u64> {
        let store = self.store()?;
        let count = self.timed(self.bulk_timeout, store.flush_all()).await?;
        info!(event = "cache_flush", deleted = count, "🧹 Cache vaciado");
        Ok(count)
    }

    pub async fn try_stats(&self) -> CacheResult<CacheStats> {
        let store = self.store()?;
        let mut stats = self.timed(self.bulk_timeout, store.stats()).await?;
        stats.backend = store.backend().to_string();
        stats.enabled = true;
        Ok(stats)
    }

    /// Liberar la conexión. Las copias vivas del cliente siguen funcionando
    /// hasta que se suelten.
    pub async fn close(self) {
        if self.store.is_some() {
            info!("👋 Cerrando cliente de cache ({})", self.backend());
        }
    }
}
