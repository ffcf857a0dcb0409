//! Storefront service binary.
//!
//! Reads its configuration from `$STOREFRONT_CONFIG` or
//! `~/.config/storefront/config.toml`. The `storefront` CLI offers overrides
//! and maintenance flags on top of the same runtime.

use tracing::{error, info};

use storefront::server::{init_tracing, ServerHandle, ServerOptions};
use storefront::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, load_error) = match AppConfig::load(None) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&config);
    if let Some(e) = load_error {
        error!("Failed to load config: {}. Using defaults.", e);
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        ..ServerOptions::default()
    })
    .await?;
    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.wait().await;
    Ok(())
}
