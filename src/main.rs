//! VegHop - single-terminal vegetable ordering and billing

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veghop::config::Config;
use veghop::routes::{router, AppState};
use veghop::services::{AdminGate, PointOfSale};
use veghop::store::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let store = FileStore::open(&config.data_dir).with_context(|| format!("opening data dir {}", config.data_dir.display()))?;
    let pos = PointOfSale::open(Arc::new(store), Some(config.catalog_file.clone())).context("opening purchase ledger")?;
    if config.admin_password.is_none() {
        tracing::warn!("VEGHOP_ADMIN_PASSWORD not set, admin routes are disabled");
    }
    let admin = AdminGate::new(config.admin_password.clone(), config.admin_max_attempts, config.admin_lockout);
    let app = router(AppState { pos: Arc::new(pos), admin: Arc::new(admin) });

    let addr = config.bind_addr();
    tracing::info!("🥕 VegHop listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
