//! Catalog administration
//!
//! Category and product CRUD. Every successful mutation drops cached listings
//! and queues an IndexNow notification.

use std::sync::Arc;

use tracing::info;

use super::sampler::ProductListing;
use crate::application::seo::IndexNotifier;
use crate::domain::listing::ListingRequest;
use crate::domain::{
    Category, DomainError, DomainResult, NewCategory, NewProduct, Product, RepositoryProvider,
};
use crate::shared::pagination::{page_offset, PaginatedResult};

pub const RECENT_PRODUCTS: u64 = 5;

/// A category together with its derived product count.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithCount {
    pub category: Category,
    pub product_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_categories: u64,
    pub total_products: u64,
    pub recent_products: Vec<Product>,
}

pub struct CatalogService {
    repos: Arc<dyn RepositoryProvider>,
    listing: Arc<dyn ProductListing>,
    notifier: Arc<dyn IndexNotifier>,
}

impl CatalogService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        listing: Arc<dyn ProductListing>,
        notifier: Arc<dyn IndexNotifier>,
    ) -> Self {
        Self {
            repos,
            listing,
            notifier,
        }
    }

    // ── Listing ────────────────────────────────────────────────

    pub async fn list_products(
        &self,
        request: ListingRequest,
    ) -> DomainResult<PaginatedResult<Product>> {
        self.listing.list_items(request).await
    }

    /// Wait for pending search engine notifications.
    pub async fn flush_notifications(&self) {
        self.notifier.flush().await;
    }

    /// Plain id-ordered pagination over one category.
    pub async fn products_in_category(
        &self,
        category_id: i32,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<Product>> {
        self.get_category(category_id).await?;
        let (items, total) = self
            .repos
            .products()
            .find_page(Some(category_id), page_offset(page, limit), limit as u64)
            .await?;
        Ok(PaginatedResult::new(items, total, page, limit))
    }

    pub fn invalidate_listing(&self) {
        self.listing.invalidate();
    }

    fn catalog_changed(&self) {
        self.listing.invalidate();
    }

    // ── Categories ─────────────────────────────────────────────

    pub async fn list_categories(&self) -> DomainResult<Vec<CategoryWithCount>> {
        let categories = self.repos.categories().find_all().await?;
        let counts = self.repos.products().count_by_category().await?;

        Ok(categories
            .into_iter()
            .map(|category| {
                let product_count = counts
                    .iter()
                    .find(|c| c.category_id == category.id)
                    .map(|c| c.product_count)
                    .unwrap_or(0);
                CategoryWithCount {
                    category,
                    product_count,
                }
            })
            .collect())
    }

    pub async fn get_category(&self, id: i32) -> DomainResult<Category> {
        self.repos
            .categories()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    async fn ensure_category_name_free(&self, name: &str, except: Option<i32>) -> DomainResult<()> {
        match self.repos.categories().find_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => Err(DomainError::Conflict(format!(
                "Category '{}' already exists",
                name
            ))),
            _ => Ok(()),
        }
    }

    pub async fn create_category(&self, input: NewCategory) -> DomainResult<Category> {
        let input = input.normalized()?;
        self.ensure_category_name_free(&input.name, None).await?;

        let category = self.repos.categories().save(input).await?;
        info!(category_id = category.id, name = %category.name, "Category created");

        self.catalog_changed();
        self.notifier.category_changed(Some(category.id));
        Ok(category)
    }

    pub async fn update_category(&self, id: i32, input: NewCategory) -> DomainResult<Category> {
        let input = input.normalized()?;
        self.get_category(id).await?;
        self.ensure_category_name_free(&input.name, Some(id)).await?;

        let category = self.repos.categories().update(id, input).await?;
        info!(category_id = id, "Category updated");

        self.catalog_changed();
        self.notifier.category_changed(Some(id));
        Ok(category)
    }

    /// Refuses while the category still owns products.
    pub async fn delete_category(&self, id: i32) -> DomainResult<()> {
        let category = self.get_category(id).await?;
        let products = self.repos.products().count_in_category(id).await?;
        if products > 0 {
            return Err(DomainError::Conflict(format!(
                "Category '{}' still has {} product(s)",
                category.name, products
            )));
        }

        self.repos.categories().delete(id).await?;
        info!(category_id = id, "Category deleted");

        self.catalog_changed();
        self.notifier.category_changed(None);
        Ok(())
    }

    // ── Products ───────────────────────────────────────────────

    pub async fn get_product(&self, id: i32) -> DomainResult<Product> {
        self.repos
            .products()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    pub async fn create_product(&self, input: NewProduct) -> DomainResult<Product> {
        let input = input.normalized()?;
        self.get_category(input.category_id).await?;

        let product = self.repos.products().save(input).await?;
        info!(
            product_id = product.id,
            category_id = product.category_id,
            "Product created"
        );

        self.catalog_changed();
        self.notifier.product_changed(Some(product.id));
        Ok(product)
    }

    pub async fn update_product(&self, id: i32, input: NewProduct) -> DomainResult<Product> {
        let input = input.normalized()?;
        self.get_product(id).await?;
        self.get_category(input.category_id).await?;

        let product = self.repos.products().update(id, input).await?;
        info!(product_id = id, "Product updated");

        self.catalog_changed();
        self.notifier.product_changed(Some(id));
        Ok(product)
    }

    pub async fn delete_product(&self, id: i32) -> DomainResult<()> {
        self.repos.products().delete(id).await?;
        info!(product_id = id, "Product deleted");

        self.catalog_changed();
        self.notifier.product_changed(None);
        Ok(())
    }

    // ── Dashboard ──────────────────────────────────────────────

    pub async fn dashboard(&self) -> DomainResult<DashboardStats> {
        Ok(DashboardStats {
            total_categories: self.repos.categories().count().await?,
            total_products: self.repos.products().count().await?,
            recent_products: self.repos.products().find_recent(RECENT_PRODUCTS).await?,
        })
    }

    pub async fn all_products(&self) -> DomainResult<Vec<Product>> {
        self.repos.products().find_all().await
    }

    pub async fn all_categories(&self) -> DomainResult<Vec<Category>> {
        self.repos.categories().find_all().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::catalog::BalancedSampler;
    use crate::infrastructure::InMemoryRepositoryProvider;

    #[derive(Default)]
    struct RecordingNotifier {
        calls: Mutex<Vec<Vec<String>>>,
        flushes: AtomicUsize,
    }

    #[async_trait]
    impl IndexNotifier for RecordingNotifier {
        fn notify(&self, urls: Vec<String>) {
            self.calls.lock().unwrap().push(urls);
        }

        async fn flush(&self) {
            self.flushes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Counts invalidations; delegates listing to a real sampler.
    struct CountingListing {
        inner: BalancedSampler,
        invalidations: AtomicUsize,
    }

    #[async_trait]
    impl ProductListing for CountingListing {
        async fn list_items(
            &self,
            request: ListingRequest,
        ) -> DomainResult<PaginatedResult<Product>> {
            self.inner.list_items(request).await
        }

        fn invalidate(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        service: CatalogService,
        listing: Arc<CountingListing>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let listing = Arc::new(CountingListing {
            inner: BalancedSampler::new(repos.clone()),
            invalidations: AtomicUsize::new(0),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let service = CatalogService::new(repos, listing.clone(), notifier.clone());
        Fixture {
            service,
            listing,
            notifier,
        }
    }

    fn category(name: &str) -> NewCategory {
        NewCategory {
            name: name.into(),
            description: None,
            image: None,
        }
    }

    fn product(name: &str, price: i64, category_id: i32) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: Some("Glazed ceramic".into()),
            price,
            category_id,
            image: Some("tile.jpg".into()),
        }
    }

    #[tokio::test]
    async fn flush_notifications_reaches_notifier() {
        let f = fixture();
        f.service.flush_notifications().await;
        assert_eq!(f.notifier.flushes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_category_name_conflicts() {
        let f = fixture();
        f.service.create_category(category("Wall Tiles")).await.unwrap();
        let err = f
            .service
            .create_category(category(" Wall Tiles "))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn renaming_category_to_itself_is_allowed() {
        let f = fixture();
        let c = f.service.create_category(category("Mosaic")).await.unwrap();
        let updated = f
            .service
            .update_category(c.id, category("Mosaic"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Mosaic");
    }

    #[tokio::test]
    async fn category_with_products_cannot_be_deleted() {
        let f = fixture();
        let c = f.service.create_category(category("Floor")).await.unwrap();
        let p = f
            .service
            .create_product(product("Porcelain", 4500, c.id))
            .await
            .unwrap();

        let err = f.service.delete_category(c.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        f.service.delete_product(p.id).await.unwrap();
        f.service.delete_category(c.id).await.unwrap();
        assert!(matches!(
            f.service.get_category(c.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn product_requires_existing_category_and_price() {
        let f = fixture();
        let err = f
            .service
            .create_product(product("Orphan", 100, 42))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Category", .. }));

        let c = f.service.create_category(category("Stone")).await.unwrap();
        let err = f
            .service
            .create_product(product("Free", 0, c.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn mutations_invalidate_and_notify() {
        let f = fixture();
        let c = f.service.create_category(category("Wall")).await.unwrap();
        let p = f
            .service
            .create_product(product("Gloss", 1500, c.id))
            .await
            .unwrap();
        f.service
            .update_product(p.id, product("Gloss White", 1600, c.id))
            .await
            .unwrap();

        assert_eq!(f.listing.invalidations.load(Ordering::SeqCst), 3);

        let calls = f.notifier.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains(&format!("/category/{}", c.id)));
        assert!(calls[2].contains(&format!("/product/{}", p.id)));
    }

    #[tokio::test]
    async fn failed_mutation_does_not_invalidate() {
        let f = fixture();
        let _ = f.service.create_product(product("X", 100, 1)).await;
        let _ = f.service.delete_product(77).await;
        assert_eq!(f.listing.invalidations.load(Ordering::SeqCst), 0);
        assert!(f.notifier.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn categories_are_listed_with_counts() {
        let f = fixture();
        let a = f.service.create_category(category("A")).await.unwrap();
        let b = f.service.create_category(category("B")).await.unwrap();
        for n in 0..3 {
            f.service
                .create_product(product(&format!("P{}", n), 100, a.id))
                .await
                .unwrap();
        }

        let listed = f.service.list_categories().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].category.id, a.id);
        assert_eq!(listed[0].product_count, 3);
        assert_eq!(listed[1].category.id, b.id);
        assert_eq!(listed[1].product_count, 0);
    }

    #[tokio::test]
    async fn dashboard_reports_totals_and_recent() {
        let f = fixture();
        let c = f.service.create_category(category("Tiles")).await.unwrap();
        for n in 0..7 {
            f.service
                .create_product(product(&format!("Tile {}", n), 100 + n, c.id))
                .await
                .unwrap();
        }

        let stats = f.service.dashboard().await.unwrap();
        assert_eq!(stats.total_categories, 1);
        assert_eq!(stats.total_products, 7);
        assert_eq!(stats.recent_products.len(), 5);
        assert_eq!(stats.recent_products[0].name, "Tile 6");
    }

    #[tokio::test]
    async fn products_in_unknown_category_is_not_found() {
        let f = fixture();
        let err = f.service.products_in_category(5, 1, 10).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn products_in_category_pages_by_id() {
        let f = fixture();
        let c = f.service.create_category(category("Tiles")).await.unwrap();
        for n in 0..5 {
            f.service
                .create_product(product(&format!("Tile {}", n), 100, c.id))
                .await
                .unwrap();
        }
        let page = f.service.products_in_category(c.id, 2, 2).await.unwrap();
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Tile 2", "Tile 3"]);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
    }
}
