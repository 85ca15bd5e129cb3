use std::sync::Arc;

use blobvault::{
    Config, StorageEngine, engine::housekeeping::housekeeping_loop, util::logging::init_logging,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let config = Arc::new(Config::from_env());
    info!(root = %config.root_dir.display(), sweep_interval = config.sweep_interval, "blobvault starting up");

    let engine = Arc::new(StorageEngine::open(&config)?);
    info!(resources = engine.len()?, "Metadata loaded");

    let housekeeping = {
        let cfg = config.clone();
        let engine = engine.clone();
        tokio::spawn(async move { housekeeping_loop(cfg, engine).await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    housekeeping.abort();
    Ok(())
}
