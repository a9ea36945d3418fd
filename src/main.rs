//! CodeDuel - Application Entry Point
//!
//! This is the main entry point for the CodeDuel server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::{net::TcpListener, sync::watch};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use codeduel::{
    catalog::Catalog,
    config::{CONFIG, StoreBackend},
    handlers, runner,
    state::AppState,
    store::{MemoryStore, QueueStore, RedisStore, RoomStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting CodeDuel server...");

    let catalog = Catalog::load(CONFIG.battle.catalog_path.as_deref())?;
    tracing::info!(challenges = catalog.len(), "Challenge catalog loaded");

    let (queue, rooms): (Arc<dyn QueueStore>, Arc<dyn RoomStore>) = match CONFIG.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            let store = Arc::new(MemoryStore::new());
            let queue: Arc<dyn QueueStore> = store.clone();
            let rooms: Arc<dyn RoomStore> = store;
            (queue, rooms)
        }
        StoreBackend::Redis => {
            tracing::info!("Connecting to Redis...");
            let store = Arc::new(
                RedisStore::connect(
                    &CONFIG.store.redis_url,
                    &CONFIG.store.key_prefix,
                    CONFIG.battle.completed_room_ttl_secs,
                )
                .await?,
            );
            let queue: Arc<dyn QueueStore> = store.clone();
            let rooms: Arc<dyn RoomStore> = store;
            (queue, rooms)
        }
    };

    let runner = runner::from_config(&CONFIG.runner).await?;
    tracing::info!(runner = runner.name(), "Code runner ready");

    // Create application state
    let state = AppState::new(CONFIG.clone(), queue, rooms, Arc::new(catalog), runner);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = state.sweeper().spawn(shutdown_rx);

    let app = handlers::app(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    shutdown_tx.send(true).ok();
    sweeper.await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into());
    let registry = tracing_subscriber::registry().with(filter);

    if CONFIG.server.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
