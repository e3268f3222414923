use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trigpoint_api::cache::{metrics, CacheClient, CacheConfig};
use trigpoint_api::config::{AppConfig, DatabaseConfig};
use trigpoint_api::repositories::PgTrigRepository;
use trigpoint_api::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("📍 Trigpoint API");
    info!("================");

    metrics::register_metrics();

    let config = AppConfig::from_env();

    // Inicializar base de datos
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;
    let pool = DatabaseConfig::new(database_url)
        .create_pool()
        .await
        .map_err(|e| {
            error!("❌ Error conectando a la base de datos: {}", e);
            anyhow::anyhow!("Error de base de datos: {}", e)
        })?;
    info!("✅ Base de datos conectada");

    // El cache nunca impide arrancar: sin Redis se sirve sin cache
    let cache = CacheClient::connect(CacheConfig::from_env()).await;
    info!("🗄️ Cache: {}", cache.backend());

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    let state = AppState::new(config, Arc::new(PgTrigRepository::new(pool.clone())), cache.clone());
    let app = create_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health, /metrics");
    info!("   GET    /v1/trigs, /v1/trigs/:id, /v1/trigs/:id/logs, /v1/trigs/:id/photos");
    info!("   PATCH  /v1/trigs/:id");
    info!("   GET    /v1/logs, /v1/logs/:id, /v1/logs/export");
    info!("   POST   /v1/logs   PATCH/DELETE /v1/logs/:id");
    info!("   POST   /v1/photos   DELETE /v1/photos/:id");
    info!("   GET    /v1/users/:id, /v1/users/:id/logs   PATCH /v1/users/:id");
    info!("   GET    /v1/stats/site");
    info!("   GET    /v1/admin/cache/stats   DELETE /v1/admin/cache?pattern=");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    cache.close().await;
    pool.close().await;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
