//! Storefront service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, catalog wiring, REST API and graceful shutdown. The CLI and
//! the plain binary both start the service through it.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{
    BalancedSampler, CachedListing, CatalogService, IndexNotifier, IndexNowClient, NoopNotifier,
    ProductListing, SitemapBuilder,
};
use crate::config::AppConfig;
use crate::domain::{DomainResult, NewCategory, NewProduct, RepositoryProvider};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
use crate::interfaces::http::modules::products::ListingLimits;
use crate::interfaces::http::{create_api_router, RouterDeps};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Create missing tables on startup (default: true)
    pub auto_migrate: bool,
    /// Insert the demo tile catalog when the store is empty (default: false)
    pub seed_demo: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            seed_demo: false,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running storefront service.
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub catalog: Arc<CatalogService>,
    pub config: AppConfig,
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global recorder can only be installed once per process; later calls
/// reuse it.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                handle
            }
            Err(e) => {
                warn!("Prometheus recorder unavailable ({}), metrics will be empty", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

fn build_notifier(config: &AppConfig) -> Arc<dyn IndexNotifier> {
    let settings = &config.indexnow;
    if settings.enabled {
        info!(host = %settings.host, "IndexNow notifications enabled");
        Arc::new(IndexNowClient::new(
            settings.endpoint.clone(),
            settings.host.clone(),
            settings.key.clone(),
        ))
    } else {
        Arc::new(NoopNotifier)
    }
}

fn build_listing(config: &AppConfig, repos: Arc<dyn RepositoryProvider>) -> Arc<dyn ProductListing> {
    let sampler = BalancedSampler::new(repos);
    let ttl = config.catalog.cache_ttl_secs;
    if ttl == 0 {
        info!("Listing cache disabled");
        Arc::new(sampler)
    } else {
        info!(
            "Listing cache TTL: {}s, max entries: {}",
            ttl, config.catalog.cache_max_entries
        );
        Arc::new(
            CachedListing::new(sampler, Duration::from_secs(ttl))
                .with_max_entries(config.catalog.cache_max_entries),
        )
    }
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting storefront service...");

        let prometheus = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&DatabaseConfig::from(&app_cfg.database)).await?;
        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Catalog ────────────────────────────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let catalog = Arc::new(CatalogService::new(
            repos.clone(),
            build_listing(&app_cfg, repos.clone()),
            build_notifier(&app_cfg),
        ));

        if opts.seed_demo {
            match seed_demo_data(&catalog).await {
                Ok(true) => info!("Demo catalog inserted"),
                Ok(false) => info!("Catalog not empty, demo data skipped"),
                Err(e) => error!("Failed to seed demo data: {}", e),
            }
        }

        // ── REST API ───────────────────────────────────────────
        let router = create_api_router(RouterDeps {
            catalog: catalog.clone(),
            sitemap: SitemapBuilder::new(app_cfg.seo.base_url.clone()),
            limits: ListingLimits {
                default_page_size: app_cfg.catalog.default_page_size,
                max_page_size: app_cfg.catalog.max_page_size,
            },
            db: db.clone(),
            prometheus,
        });

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let api_addr = app_cfg.api_address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let api_port = listener.local_addr()?.port();
        info!("REST API listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            repos,
            catalog,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the shutdown signal, then for the API and pending IndexNow
    /// submissions to drain (bounded by `server.shutdown_timeout`) and close
    /// the database.
    pub async fn wait(self) {
        let Self {
            shutdown,
            api_task,
            catalog,
            db,
            ..
        } = self;

        let drained = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API task panicked: {}", e),
                }
                catalog.flush_notifications().await;
            })
            .await;
        if !drained {
            warn!("Abandoning in-flight requests and IndexNow submissions");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Storefront service shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down storefront service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

const DEMO_CATEGORIES: &[(&str, &str)] = &[
    ("Wall Tiles", "Premium wall tiles for bathrooms and kitchens"),
    ("Floor Tiles", "Durable floor tiles for all spaces"),
    ("Mosaic Tiles", "Decorative mosaic tiles for accent walls"),
    ("Natural Stone", "Natural stone tiles for elegant finishes"),
];

/// Insert the demo tile catalog. Returns `false` without touching anything
/// when categories already exist.
pub async fn seed_demo_data(catalog: &CatalogService) -> DomainResult<bool> {
    if !catalog.all_categories().await?.is_empty() {
        return Ok(false);
    }

    let mut wall_tiles = None;
    for (name, description) in DEMO_CATEGORIES {
        let category = catalog
            .create_category(NewCategory {
                name: name.to_string(),
                description: Some(description.to_string()),
                image: None,
            })
            .await?;
        if wall_tiles.is_none() {
            wall_tiles = Some(category.id);
        }
    }

    if let Some(category_id) = wall_tiles {
        catalog
            .create_product(NewProduct {
                name: "Premium Ceramic Wall Tiles".to_string(),
                description: Some(
                    "Premium ceramic wall tiles perfect for bathrooms and kitchens. \
                     Durable, water resistant and easy to maintain."
                        .to_string(),
                ),
                price: 4500,
                category_id,
                image: None,
            })
            .await?;
    }
    Ok(true)
}

/// Install the global tracing subscriber. Call once, before
/// [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
