//! In-memory repository implementations

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::category::{Category, CategoryCount, CategoryRepository, NewCategory};
use crate::domain::product::{NewProduct, Product, ProductRepository};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// In-memory category store
pub struct InMemoryCategoryRepository {
    categories: DashMap<i32, Category>,
    counter: AtomicI32,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Category>> {
        Ok(self.categories.get(&id).map(|c| c.clone()))
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Category>> {
        Ok(self
            .categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Category>> {
        let mut all: Vec<Category> = self.categories.iter().map(|c| c.clone()).collect();
        all.sort_by_key(|c| c.id);
        Ok(all)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.categories.len() as u64)
    }

    async fn save(&self, c: NewCategory) -> DomainResult<Category> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let category = Category {
            id,
            name: c.name,
            description: c.description,
            image: c.image,
            created_at: now,
            updated_at: now,
        };
        self.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i32, c: NewCategory) -> DomainResult<Category> {
        let mut entry = self
            .categories
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Category", id))?;
        entry.name = c.name;
        entry.description = c.description;
        entry.image = c.image;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        self.categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Category", id))
    }
}

/// In-memory product store
pub struct InMemoryProductRepository {
    products: DashMap<i32, Product>,
    counter: AtomicI32,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }

    fn sorted(&self, category_id: Option<i32>) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .map(|p| p.clone())
            .collect();
        products.sort_by_key(|p| p.id);
        products
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Product>> {
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Product>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn count_by_category(&self) -> DomainResult<Vec<CategoryCount>> {
        let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
        for p in self.products.iter() {
            *counts.entry(p.category_id).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(category_id, product_count)| CategoryCount {
                category_id,
                product_count,
            })
            .collect())
    }

    async fn ids_by_category(&self, category_id: i32) -> DomainResult<Vec<i32>> {
        Ok(self
            .sorted(Some(category_id))
            .into_iter()
            .map(|p| p.id)
            .collect())
    }

    async fn find_page(
        &self,
        category_id: Option<i32>,
        offset: u64,
        limit: u64,
    ) -> DomainResult<(Vec<Product>, u64)> {
        let all = self.sorted(category_id);
        let total = all.len() as u64;
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_recent(&self, limit: u64) -> DomainResult<Vec<Product>> {
        let mut all = self.sorted(None);
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn find_all(&self) -> DomainResult<Vec<Product>> {
        Ok(self.sorted(None))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.products.len() as u64)
    }

    async fn count_in_category(&self, category_id: i32) -> DomainResult<u64> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .count() as u64)
    }

    async fn save(&self, p: NewProduct) -> DomainResult<Product> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let product = Product {
            id,
            name: p.name,
            description: p.description,
            price: p.price,
            category_id: p.category_id,
            image: p.image,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i32, p: NewProduct) -> DomainResult<Product> {
        let mut entry = self
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Product", id))?;
        entry.name = p.name;
        entry.description = p.description;
        entry.price = p.price;
        entry.category_id = p.category_id;
        entry.image = p.image;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        self.products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Product", id))
    }
}

/// Repository provider backed by in-memory maps.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    categories: InMemoryCategoryRepository,
    products: InMemoryProductRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn categories(&self) -> &dyn CategoryRepository {
        &self.categories
    }

    fn products(&self) -> &dyn ProductRepository {
        &self.products
    }
}
