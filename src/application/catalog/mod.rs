mod cache;
mod sampler;
mod service;

pub use cache::CachedListing;
pub use sampler::{BalancedSampler, ProductListing};
pub use service::{CatalogService, CategoryWithCount, DashboardStats, RECENT_PRODUCTS};
