//! Product DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{NewProduct, Product};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Smallest currency unit
    pub price: i64,
    /// `price` formatted as `major.minor`
    pub price_display: String,
    pub category_id: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            price_display: p.format_price(),
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            category_id: p.category_id,
            image: p.image,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Body for `POST /products` and `PUT /products/{id}` (full replacement).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200, message = "product name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "price must be positive"))]
    pub price: i64,
    pub category_id: i32,
    #[validate(length(max = 255))]
    pub image: Option<String>,
}

impl From<ProductRequest> for NewProduct {
    fn from(r: ProductRequest) -> Self {
        Self {
            name: r.name,
            description: r.description.filter(|d| !d.trim().is_empty()),
            price: r.price,
            category_id: r.category_id,
            image: r.image.filter(|i| !i.trim().is_empty()),
        }
    }
}

/// Query for the storefront listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListProductsParams {
    /// 1-based page; values below 1 are treated as 1
    pub page: Option<i64>,
    /// Category id, or `all` (default) for the balanced sample
    pub category: Option<String>,
    /// Page size; defaults to the configured size and is capped at the
    /// configured maximum
    pub per_page: Option<i64>,
    /// Fixed shuffle seed; defaults to today's UTC date
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
