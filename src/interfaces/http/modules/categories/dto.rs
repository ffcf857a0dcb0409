//! Category DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::CategoryWithCount;
use crate::domain::{Category, NewCategory};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Present on listings; omitted for single-category responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            image: c.image,
            product_count: None,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<CategoryWithCount> for CategoryDto {
    fn from(c: CategoryWithCount) -> Self {
        Self {
            product_count: Some(c.product_count),
            ..CategoryDto::from(c.category)
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100, message = "category name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
}

impl From<CategoryRequest> for NewCategory {
    fn from(r: CategoryRequest) -> Self {
        Self {
            name: r.name,
            description: r.description.filter(|d| !d.trim().is_empty()),
            image: r.image.filter(|i| !i.trim().is_empty()),
        }
    }
}
