//! Category repository interface

use async_trait::async_trait;

use super::model::{Category, NewCategory};
use crate::domain::DomainResult;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Category>>;
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Category>>;
    /// All categories ordered by ascending id.
    async fn find_all(&self) -> DomainResult<Vec<Category>>;
    async fn count(&self) -> DomainResult<u64>;
    async fn save(&self, category: NewCategory) -> DomainResult<Category>;
    async fn update(&self, id: i32, category: NewCategory) -> DomainResult<Category>;
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
