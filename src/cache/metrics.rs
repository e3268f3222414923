//! Métricas Prometheus del cache

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::warn;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref CACHE_HITS: IntCounter =
        IntCounter::new("cache_hits_total", "Lecturas servidas desde el cache")
            .expect("metric can be created");

    pub static ref CACHE_MISSES: IntCounter =
        IntCounter::new("cache_misses_total", "Lecturas que ejecutaron la consulta subyacente")
            .expect("metric can be created");

    pub static ref CACHE_BYPASS: IntCounter =
        IntCounter::new("cache_bypass_total", "Lecturas con no-cache explícito")
            .expect("metric can be created");

    pub static ref CACHE_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("cache_errors_total", "Errores del store absorbidos por operación"),
        &["operation"]
    )
    .expect("metric can be created");

    pub static ref CACHE_INVALIDATED_KEYS: IntCounter = IntCounter::new(
        "cache_invalidated_keys_total",
        "Claves eliminadas por invalidación"
    )
    .expect("metric can be created");
}

/// Registrar las métricas en el registry. Idempotente a efectos prácticos:
/// un segundo registro solo produce un warning.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CACHE_HITS.clone()),
        Box::new(CACHE_MISSES.clone()),
        Box::new(CACHE_BYPASS.clone()),
        Box::new(CACHE_ERRORS.clone()),
        Box::new(CACHE_INVALIDATED_KEYS.clone()),
    ];

    for collector in collectors {
        if let Err(e) = REGISTRY.register(collector) {
            warn!("⚠️ Métrica ya registrada: {}", e);
        }
    }
}

/// Exportar en formato texto para `/metrics`
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        warn!("⚠️ Error codificando métricas: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
