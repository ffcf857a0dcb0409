//! Category domain entity

use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

/// A product category.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Image file name; the bytes live outside this service.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl NewCategory {
    /// Trim the name and reject an empty one.
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::Validation(
                "Category name is required".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Number of products in one category, as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCount {
    pub category_id: i32,
    pub product_count: u64,
}
