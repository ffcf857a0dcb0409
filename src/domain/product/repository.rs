//! Product repository interface
//!
//! Besides CRUD this is the catalog store the listing sampler reads from:
//! grouped counts, ids per category, fetch by id set and offset pagination.

use async_trait::async_trait;

use super::model::{NewProduct, Product};
use crate::domain::category::CategoryCount;
use crate::domain::DomainResult;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Product>>;

    /// Products whose id is in `ids`, in no particular order. Unknown ids
    /// are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Product>>;

    /// Product counts per category, only categories with at least one
    /// product, ordered by ascending category id.
    async fn count_by_category(&self) -> DomainResult<Vec<CategoryCount>>;

    /// Ids of every product in `category_id`, ordered by ascending id.
    async fn ids_by_category(&self, category_id: i32) -> DomainResult<Vec<i32>>;

    /// Offset/limit page ordered by ascending id, optionally filtered by
    /// category. Returns the page and the filtered total.
    async fn find_page(
        &self,
        category_id: Option<i32>,
        offset: u64,
        limit: u64,
    ) -> DomainResult<(Vec<Product>, u64)>;

    /// Most recently created products first.
    async fn find_recent(&self, limit: u64) -> DomainResult<Vec<Product>>;

    /// Every product ordered by ascending id.
    async fn find_all(&self) -> DomainResult<Vec<Product>>;

    async fn count(&self) -> DomainResult<u64>;
    async fn count_in_category(&self, category_id: i32) -> DomainResult<u64>;
    async fn save(&self, product: NewProduct) -> DomainResult<Product>;
    async fn update(&self, id: i32, product: NewProduct) -> DomainResult<Product>;
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
