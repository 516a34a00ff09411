//! Entrypoint for the data-availability proxy binary.

mod cfg;
mod http;
mod metrics;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cfg::{Config, PrimaryKind};
use clap::Parser;
use eigenda_proxy_backend::{Backend, KvBackend, MemstoreBackend, RedisBackend, S3Backend};
use eigenda_proxy_core::{StorageManager, StorageManagerConfig};
use eigenda_proxy_router::{SecondaryRouter, SecondaryRouterConfig};
use eigenda_proxy_types::BackendType;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose);

    if config.primary != PrimaryKind::Memstore {
        bail!(
            "primary {:?} requires a disperser client wired in by the deployer; \
             only memstore is runnable out of the box",
            config.primary
        );
    }

    metrics::install(&config.metrics_addr).context("failed to start metrics listener")?;

    let memstore = Arc::new(MemstoreBackend::default());
    let secondaries = build_secondaries(&config).await?;

    let router_config = SecondaryRouterConfig {
        cache_targets: config.cache_target_types().map_err(anyhow::Error::msg)?,
        fallback_targets: config.fallback_target_types().map_err(anyhow::Error::msg)?,
        concurrent_write_threads: config.concurrent_write_threads,
        write_queue_bound: config.write_queue_bound,
    };
    let secondary_router = SecondaryRouter::new(memstore.clone(), secondaries, router_config)
        .map_err(|e| anyhow::anyhow!(e))?;

    let manager = StorageManager::new(
        secondary_router,
        StorageManagerConfig {
            mode: config.commitment_mode(),
            version: config.primary.commitment_version(),
            encoding: config.cert_encoding(),
            max_blob_bytes: config.max_blob_bytes(),
        },
    );

    let state = Arc::new(http::AppState { manager, memstore });
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(addr = %config.addr, "eigenda-proxy-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("eigenda-proxy-server exiting");
    Ok(())
}

async fn build_secondaries(config: &Config) -> Result<HashMap<BackendType, Arc<dyn Backend>>> {
    let mut secondaries: HashMap<BackendType, Arc<dyn Backend>> = HashMap::new();

    let mut requested = config.cache_target_types().map_err(anyhow::Error::msg)?;
    requested.extend(config.fallback_target_types().map_err(anyhow::Error::msg)?);

    for target in requested {
        if secondaries.contains_key(&target) {
            continue;
        }
        let backend: Arc<dyn Backend> = match target {
            BackendType::S3 => {
                let bucket = config.s3_bucket.clone().context("s3 secondary configured without --s3-bucket")?;
                let aws_config = aws_config::load_from_env().await;
                Arc::new(S3Backend::new(aws_sdk_s3::Client::new(&aws_config), bucket))
            }
            BackendType::Redis => {
                let url = config.redis_url.clone().context("redis secondary configured without --redis-url")?;
                let client = redis::Client::open(url).context("invalid redis url")?;
                Arc::new(RedisBackend::new(client, config.redis_eviction_seconds))
            }
            BackendType::Kv => {
                let path = config.rocksdb_path.clone().context("kv secondary configured without --rocksdb-path")?;
                Arc::new(KvBackend::open(&path, std::time::Duration::from_secs(30)).map_err(|e| anyhow::anyhow!(e))?)
            }
            other => bail!("{other} is not a valid secondary backend target"),
        };
        secondaries.insert(target, backend);
    }

    Ok(secondaries)
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
