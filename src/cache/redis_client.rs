use std::sync::Arc;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use tokio::sync::OnceCell;
use tokio::time::timeout_at;
use tracing::{debug, info, warn};

use super::operations::{CacheError, CacheOperations, CacheResult, CacheStats, DeleteBudget};

/// Cliente Redis con connection manager compartido.
///
/// La conexión se abre en la primera operación. Si falla, esa operación
/// devuelve el error y la siguiente vuelve a intentarlo; una vez abierta, el
/// `ConnectionManager` se encarga de reconectar.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
    manager: Arc<OnceCell<ConnectionManager>>,
    masked_url: String,
    scan_count: usize,
}

impl RedisClient {
    /// Validar la URL sin abrir conexión
    pub fn new(redis_url: &str, scan_count: usize) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)?;

        Ok(Self {
            client,
            manager: Arc::new(OnceCell::new()),
            masked_url: mask_redis_url(redis_url),
            scan_count: scan_count.max(1),
        })
    }

    /// Crear nuevo cliente Redis y verificar la conexión con PING
    pub async fn connect(redis_url: &str, scan_count: usize) -> CacheResult<Self> {
        let client = Self::new(redis_url, scan_count)?;
        client.ping().await?;
        Ok(client)
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                info!("🔗 Conectando a Redis: {}", self.masked_url);
                let manager = ConnectionManager::new(self.client.clone()).await?;
                info!("✅ Redis conectado exitosamente");
                Ok::<_, CacheError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheOperations for RedisClient {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(key, value, ttl_seconds.max(1)).await?;
        Ok(())
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        let mut conn = self.connection().await?;
        // -2: no existe, -1: sin expiración
        let ttl: i64 = conn.ttl(key).await?;
        Ok(if ttl >= 0 { Some(ttl as u64) } else { None })
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.connection().await?;
        let count: u64 = conn.del(key).await?;
        Ok(count)
    }

    async fn delete_pattern(&self, pattern: &str, budget: &DeleteBudget) -> CacheResult<u64> {
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;

        loop {
            if budget.expired() {
                return partial(pattern, budget, "plazo agotado");
            }

            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.scan_count);
            let scan = cmd.query_async::<_, (u64, Vec<String>)>(&mut conn);
            let page: RedisResult<(u64, Vec<String>)> = match timeout_at(budget.deadline(), scan).await {
                Ok(page) => page,
                Err(_) => return partial(pattern, budget, "SCAN fuera de plazo"),
            };

            let (next_cursor, keys) = match page {
                Ok(page) => page,
                // Lo ya borrado cuenta; el resto caducará por TTL
                Err(e) if budget.deleted() > 0 => {
                    warn!(
                        pattern = pattern,
                        deleted = budget.deleted(),
                        error = %e,
                        "⚠️ SCAN interrumpido, borrado parcial"
                    );
                    return Ok(budget.deleted());
                }
                Err(e) => return Err(e.into()),
            };

            if !keys.is_empty() {
                match timeout_at(budget.deadline(), conn.del::<_, u64>(&keys)).await {
                    Ok(Ok(count)) => budget.record(count),
                    Ok(Err(e)) => {
                        warn!(
                            pattern = pattern,
                            batch = keys.len(),
                            error = %e,
                            "⚠️ Error eliminando lote de claves"
                        );
                    }
                    Err(_) => return partial(pattern, budget, "DEL fuera de plazo"),
                }
            }

            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        debug!(pattern = pattern, deleted = budget.deleted(), "🗑️ SCAN+DEL completado");
        Ok(budget.deleted())
    }

    async fn flush_all(&self) -> CacheResult<u64> {
        let mut conn = self.connection().await?;

        let key_count: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
        info!("🧹 Limpiando cache completo ({} claves)...", key_count);
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;

        Ok(key_count)
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        let mut conn = self.connection().await?;

        let info: String = redis::cmd("INFO").query_async(&mut conn).await?;
        let key_count: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;

        let mut stats = parse_info(&info);
        stats.key_count = key_count;
        stats.connected = true;

        Ok(stats.with_hit_rate())
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let response: String = redis::cmd("PING").query_async(&mut conn).await?;
        if response == "PONG" {
            Ok(())
        } else {
            Err(CacheError::Unavailable(format!("unexpected PING reply: {}", response)))
        }
    }
}

/// Cortar un borrado por plazo: lo borrado cuenta, sin nada borrado es timeout
fn partial(pattern: &str, budget: &DeleteBudget, reason: &str) -> CacheResult<u64> {
    let deleted = budget.deleted();
    if deleted == 0 {
        return Err(budget.timeout_error());
    }
    warn!(pattern = pattern, deleted = deleted, reason = reason, "⏱️ Borrado por patrón parcial");
    Ok(deleted)
}

/// Parsear la salida de `INFO` en estadísticas básicas
fn parse_info(info: &str) -> CacheStats {
    let mut stats = CacheStats::default();

    for line in info.lines() {
        let Some((field, value)) = line.trim().split_once(':') else {
            continue;
        };

        match field {
            "connected_clients" => stats.connected_clients = value.parse().unwrap_or(0),
            "used_memory" => stats.memory_bytes = value.parse().unwrap_or(0),
            "used_memory_human" => stats.memory_human = value.to_string(),
            "total_commands_processed" => stats.total_commands = value.parse().unwrap_or(0),
            "keyspace_hits" => stats.hits = value.parse().unwrap_or(0),
            "keyspace_misses" => stats.misses = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    stats
}

/// Ocultar credenciales de la URL en logs
fn mask_redis_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
