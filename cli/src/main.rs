//! Storefront catalog service, CLI launcher
//!
//! ```sh
//! # Run with default config (~/.config/storefront/config.toml)
//! storefront
//!
//! # Custom config path and port
//! storefront --config /etc/storefront/config.toml --api-port 8081
//!
//! # Validate config without starting
//! storefront --check
//!
//! # Fill an empty database with the demo tile catalog
//! storefront --seed-demo
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use storefront::config::AppConfig;
use storefront::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "storefront",
    version,
    about = "Storefront catalog service",
    long_about = "REST API for a product catalog with a category-balanced storefront \
                  listing, sitemaps and IndexNow notifications.\n\n\
                  Default config: ~/.config/storefront/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip creating tables on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Insert demo categories and products if the catalog is empty.
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);

    let (mut config, load_error) = match AppConfig::load(Some(&config_path)) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    if cli.check {
        if let Some(e) = load_error {
            eprintln!("Configuration error in {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
        let problems = config.validate();
        if !problems.is_empty() {
            eprintln!("Configuration problems in {}:", config_path.display());
            for problem in &problems {
                eprintln!("   - {}", problem);
            }
            std::process::exit(1);
        }
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.api_address());
        println!("   Database    : {}", config.database.connection_url());
        println!("   Log level   : {}", config.logging.level);
        println!("   Cache TTL   : {}s", config.catalog.cache_ttl_secs);
        println!("   Cache size  : {} entries", config.catalog.cache_max_entries);
        println!("   IndexNow    : {}", config.indexnow.enabled);
        return Ok(());
    }

    init_tracing(&config);
    match load_error {
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
        None => info!("Configuration loaded from {}", config_path.display()),
    }
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        seed_demo: cli.seed_demo,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.wait().await;
    Ok(())
}
