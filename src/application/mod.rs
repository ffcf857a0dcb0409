//! Application layer: use cases on top of the domain repositories.

pub mod catalog;
pub mod seo;

pub use catalog::{
    BalancedSampler, CachedListing, CatalogService, CategoryWithCount, DashboardStats,
    ProductListing,
};
pub use seo::{IndexNotifier, IndexNowClient, NoopNotifier, SitemapBuilder};
