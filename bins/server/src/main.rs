//! Konsern API Server
//!
//! Main entry point for the Konsern backend service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use konsern_api::{AppState, create_router, middleware::DemoIdentity};
use konsern_core::app::{AppContext, spawn_poll};
use konsern_core::budget::DeviationMode;
use konsern_shared::AppConfig;
use konsern_shared::config::StoreMode;
use konsern_shared::types::GroupId;
use konsern_store::{MemoryStore, RestStore, TableStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "konsern=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Select the storage backend
    let store: Arc<dyn TableStore> = match config.store.mode {
        StoreMode::Demo => {
            info!("Using in-memory demo store");
            let store = Arc::new(MemoryStore::new());
            konsern_core::demo::seed(store.as_ref()).await?;
            store
        }
        StoreMode::Rest => {
            info!(base_url = %config.store.base_url, "Using remote rowstore");
            Arc::new(RestStore::new(
                config.store.base_url.clone(),
                config.store.api_key.clone(),
            ))
        }
    };

    let default_mode =
        DeviationMode::parse(&config.display.deviation_mode).unwrap_or(DeviationMode::MonthEnd);

    // Build the application context and run the bootstrap state machine
    let group_id = GroupId::new(1);
    let ctx = AppContext::new(store, group_id, default_mode);
    ctx.bootstrap().await;
    info!(phase = ctx.phase().await.name(), "context initialized");

    // Background reload poll
    if config.poll.enabled {
        let interval = Duration::from_secs(config.poll.interval_secs.max(1));
        spawn_poll(&ctx, interval);
        info!(interval_secs = config.poll.interval_secs, "background poll running");
    }

    // Create application state
    let state = AppState {
        ctx,
        identity: Arc::new(DemoIdentity),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
