//! robots.txt and sitemap endpoints

pub mod handlers;

pub use handlers::*;
