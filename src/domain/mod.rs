//! Domain layer: catalog entities, repository interfaces and listing rules

pub mod category;
pub mod listing;
pub mod product;
pub mod repositories;

pub use category::{Category, CategoryCount, CategoryRepository, NewCategory};
pub use listing::{CategorySelector, ListingRequest};
pub use product::{NewProduct, Product, ProductRepository};
pub use repositories::{DomainResult, RepositoryProvider};

pub use crate::shared::errors::DomainError;
