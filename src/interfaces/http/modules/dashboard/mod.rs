//! Admin dashboard and cache control

pub mod handlers;

pub use handlers::*;
