//! Mediaforge Daemon - Main Entry Point
//! JSON-RPC server + single-worker generation queue

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mediaforge_api_rpc::{RpcServer, RpcServerConfig};
use mediaforge_core::application::{EngineConfig, GenerationClient, JobProcessor, QueueManager};
use mediaforge_core::port::{SystemClock, TokioSleeper};
use mediaforge_infra_http::{
    HttpArtifactStore, HttpArtifactStoreConfig, HttpEnrichmentProvider, HttpGenerationProvider,
};
use mediaforge_infra_sqlite::{create_pool, run_migrations, SqliteRecordStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.mediaforge/records.db";
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON format for production)
    let log_format = env_or("MEDIAFORGE_LOG_FORMAT", "pretty");

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("mediaforge=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Mediaforge daemon v{} starting...", VERSION);

    // 2. Load configuration
    let db_path = std::env::var("MEDIAFORGE_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());
    let rpc_port: u16 = env_parse("MEDIAFORGE_RPC_PORT", 9533);

    let enrichment_url = env_or("MEDIAFORGE_ENRICHMENT_URL", "http://127.0.0.1:8801");
    let generation_url = env_or("MEDIAFORGE_GENERATION_URL", "http://127.0.0.1:8802");
    let storage_upload_url = env_or("MEDIAFORGE_STORAGE_UPLOAD_URL", "http://127.0.0.1:8803/upload");
    let storage_public_url = env_or("MEDIAFORGE_STORAGE_PUBLIC_URL", "http://127.0.0.1:8803/files");

    let engine_config = EngineConfig {
        unit_delay: Duration::from_millis(env_parse("MEDIAFORGE_UNIT_DELAY_MS", 8_000u64)),
        poll_interval: Duration::from_millis(env_parse("MEDIAFORGE_POLL_INTERVAL_MS", 5_000u64)),
        max_poll_attempts: env_parse("MEDIAFORGE_MAX_POLL_ATTEMPTS", 120u32),
        max_item_retries: env_parse("MEDIAFORGE_MAX_ITEM_RETRIES", 3u32),
        ..EngineConfig::default()
    };

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let clock = Arc::new(SystemClock);
    let sleeper = Arc::new(TokioSleeper);
    let record_store = Arc::new(SqliteRecordStore::new(pool.clone(), clock.clone()));

    let http_client = reqwest::Client::builder()
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| anyhow::anyhow!("HTTP client construction failed: {}", e))?;

    let enrichment = Arc::new(HttpEnrichmentProvider::new(
        http_client.clone(),
        enrichment_url,
    ));
    let generation = Arc::new(HttpGenerationProvider::new(
        http_client.clone(),
        generation_url,
    ));
    let artifacts = Arc::new(HttpArtifactStore::new(
        http_client,
        HttpArtifactStoreConfig {
            upload_base: storage_upload_url,
            public_base: storage_public_url,
        },
    ));

    let client = GenerationClient::new(
        enrichment,
        generation,
        artifacts,
        sleeper.clone(),
        engine_config.clone(),
    );
    let processor = Arc::new(JobProcessor::new(
        record_store.clone(),
        client,
        sleeper.clone(),
        clock.clone(),
        &engine_config,
    ));
    let queue = QueueManager::new(processor, record_store, clock, sleeper);

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: rpc_port,
        ..Default::default()
    };
    let rpc_server = RpcServer::new(rpc_config, queue);
    let rpc_handle = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!("System ready. Waiting for submissions...");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Stop accepting RPC calls; the worker loop dies with the process.
    // The queue is best-effort by design: interrupted items are simply
    // resubmitted by the caller.
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;

    info!("Shutdown complete.");

    Ok(())
}
