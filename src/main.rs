//! Peer Cache node
//!
//! Runs one cache instance serving a demo `scores` group backed by an
//! in-memory table, sharing keys with the peers listed in `PEERS`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peer_cache::{create_router, loader_fn, AppState, Config, GroupRegistry, PeerPool};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the demo group and its loader
/// 4. Join the configured peer set
/// 5. Serve peer and API requests until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peer_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peer Cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: addr={}, cache_bytes={}, replicas={}, peers={:?}",
        config.server_addr, config.cache_bytes, config.replicas, config.peers
    );

    let registry = Arc::new(GroupRegistry::new());
    let scores = registry.new_group("scores", config.cache_bytes, slow_db_loader());

    let pool = PeerPool::new(config.server_addr.clone())
        .with_base_path(&config.base_path)
        .with_replicas(config.replicas)
        .with_timeout(config.peer_timeout);
    pool.set_peers(&config.peers)
        .context("invalid peer address")?;
    scores.register_peers(Arc::new(pool));

    let app = create_router(AppState::with_base_path(registry, &config.base_path));

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;
    info!("Node listening on http://{}", config.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Node shutdown complete");
    Ok(())
}

/// Loader over a small fixed table that answers slowly, standing in for a
/// database.
fn slow_db_loader() -> Arc<dyn peer_cache::Loader> {
    let db: Arc<HashMap<&'static str, &'static str>> =
        Arc::new(HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]));

    loader_fn(move |key: String| {
        let db = Arc::clone(&db);
        async move {
            info!(key = %key, "[SlowDB] search key");
            tokio::time::sleep(Duration::from_millis(100)).await;
            match db.get(key.as_str()) {
                Some(value) => Ok(value.as_bytes().to_vec()),
                None => Err(anyhow::anyhow!("{} not exist", key)),
            }
        }
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
