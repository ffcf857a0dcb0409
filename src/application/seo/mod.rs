pub mod indexnow;
pub mod sitemap;

pub use indexnow::{IndexNotifier, IndexNowClient, NoopNotifier};
pub use sitemap::SitemapBuilder;
