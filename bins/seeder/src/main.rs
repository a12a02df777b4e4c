//! Rowstore seeder for Konsern development and testing.
//!
//! Seeds the demo tenant (companies, users, access grants, reports,
//! forecasts) into the configured remote rowstore.
//!
//! Usage: cargo run --bin seeder

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use konsern_core::demo;
use konsern_shared::AppConfig;
use konsern_store::RestStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "konsern=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().expect("Failed to load configuration");
    let store = RestStore::new(config.store.base_url.clone(), config.store.api_key.clone());

    println!("Seeding demo tenant into {}...", config.store.base_url);
    demo::seed(&store).await?;
    println!("Seeding complete!");

    Ok(())
}
