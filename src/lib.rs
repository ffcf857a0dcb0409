//! # Storefront Catalog Service
//!
//! Product/category administration and a category-balanced storefront
//! listing, served over a JSON REST API with sitemaps and IndexNow
//! notifications.
//!
//! ## Architecture
//!
//! - **domain**: entities, listing rules and repository traits
//! - **application**: balanced sampler, listing cache, catalog service, SEO
//! - **infrastructure**: SeaORM persistence and in-memory repositories
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, pagination, shutdown coordination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::AppConfig;
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use interfaces::http::create_api_router;
