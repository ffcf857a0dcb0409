//! Product domain entity

use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;

/// A sellable item. Belongs to exactly one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Price in the smallest currency unit (e.g. cents)
    pub price: i64,
    pub category_id: i32,
    /// Image file name; the bytes live outside this service.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Format the price as `major.minor`, e.g. `4500` -> `"45.00"`.
    pub fn format_price(&self) -> String {
        format!("{}.{:02}", self.price / 100, self.price % 100)
    }
}

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: i32,
    pub image: Option<String>,
}

impl NewProduct {
    /// Trim the name, then check name and price.
    pub fn normalized(mut self) -> Result<Self, DomainError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::Validation(
                "Product name is required".to_string(),
            ));
        }
        if self.price <= 0 {
            return Err(DomainError::Validation(
                "Valid price is required".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: i64) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: None,
            price,
            category_id: 1,
            image: None,
        }
    }

    #[test]
    fn format_price_pads_minor_units() {
        let now = Utc::now();
        let product = Product {
            id: 1,
            name: "Mosaic".into(),
            description: None,
            price: 4505,
            category_id: 1,
            image: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(product.format_price(), "45.05");
    }

    #[test]
    fn zero_price_is_rejected() {
        let err = new_product("Tile", 0).normalized().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("price")));
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = new_product(" ", 100).normalized().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("name")));
    }

    #[test]
    fn valid_product_passes() {
        let p = new_product(" Floor Tile ", 2500).normalized().unwrap();
        assert_eq!(p.name, "Floor Tile");
    }
}
