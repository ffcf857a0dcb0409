//! HTTP REST API
//!
//! - `common`: response envelope, pagination, error mapping, validated JSON
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table, middleware stack and Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, RouterDeps};
