//! TTL cache in front of the balanced sampler

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::sampler::{BalancedSampler, ProductListing};
use crate::domain::listing::ListingRequest;
use crate::domain::{DomainResult, Product};
use crate::shared::pagination::PaginatedResult;

pub const DEFAULT_MAX_ENTRIES: usize = 1024;

struct CacheEntry {
    stored_at: Instant,
    generation: u64,
    page: PaginatedResult<Product>,
}

/// Memoizes listing pages for `ttl`.
///
/// Requests are keyed with their seed already resolved, so a request without
/// a seed maps to a new key at UTC midnight. Every `invalidate()` bumps the
/// generation; entries from an older generation are never served.
pub struct CachedListing {
    inner: BalancedSampler,
    entries: DashMap<ListingRequest, CacheEntry>,
    generation: AtomicU64,
    ttl: Duration,
    max_entries: usize,
}

impl CachedListing {
    pub fn new(inner: BalancedSampler, ttl: Duration) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn lookup(&self, key: &ListingRequest) -> Option<PaginatedResult<Product>> {
        let entry = self.entries.get(key)?;
        if entry.generation == self.current_generation() && entry.stored_at.elapsed() < self.ttl
        {
            return Some(entry.page.clone());
        }
        drop(entry);
        self.entries.remove(key);
        None
    }

    /// Make room for one more entry: drop expired pages first, then the
    /// oldest ones.
    fn evict(&self) {
        if self.entries.len() < self.max_entries {
            return;
        }
        let generation = self.current_generation();
        let ttl = self.ttl;
        self.entries
            .retain(|_, e| e.generation == generation && e.stored_at.elapsed() < ttl);

        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.stored_at)
                .map(|e| *e.key());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
        metrics::counter!("listing_cache_evictions_total").increment(1);
    }

    fn store(&self, key: ListingRequest, generation: u64, page: &PaginatedResult<Product>) {
        if generation != self.current_generation() {
            debug!("Listing cache invalidated during lookup, result not stored");
            return;
        }
        self.evict();
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                generation,
                page: page.clone(),
            },
        );
    }
}

#[async_trait]
impl ProductListing for CachedListing {
    async fn list_items(&self, request: ListingRequest) -> DomainResult<PaginatedResult<Product>> {
        if !self.is_enabled() {
            return self.inner.list_items(request).await;
        }

        let key = request.with_seed(self.inner.resolve_seed(&request));
        if let Some(page) = self.lookup(&key) {
            metrics::counter!("listing_cache_hits_total").increment(1);
            return Ok(page);
        }
        metrics::counter!("listing_cache_misses_total").increment(1);

        let generation = self.current_generation();
        let page = self.inner.list_items(key).await?;
        self.store(key, generation, &page);
        Ok(page)
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let dropped = self.entries.len();
        self.entries.clear();
        debug!(dropped, "Listing cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;
    use crate::domain::category::CategoryCount;
    use crate::domain::{
        CategoryRepository, NewCategory, NewProduct, ProductRepository, RepositoryProvider,
    };
    use crate::infrastructure::InMemoryRepositoryProvider;

    /// Product store that can hold one `count_by_category` call after it has
    /// read the catalog, until released.
    struct GatedProducts {
        inner: Arc<InMemoryRepositoryProvider>,
        armed: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProductRepository for GatedProducts {
        async fn find_by_id(&self, id: i32) -> DomainResult<Option<Product>> {
            self.inner.products().find_by_id(id).await
        }

        async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Product>> {
            self.inner.products().find_by_ids(ids).await
        }

        async fn count_by_category(&self) -> DomainResult<Vec<CategoryCount>> {
            let counts = self.inner.products().count_by_category().await;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            counts
        }

        async fn ids_by_category(&self, category_id: i32) -> DomainResult<Vec<i32>> {
            self.inner.products().ids_by_category(category_id).await
        }

        async fn find_page(
            &self,
            category_id: Option<i32>,
            offset: u64,
            limit: u64,
        ) -> DomainResult<(Vec<Product>, u64)> {
            self.inner
                .products()
                .find_page(category_id, offset, limit)
                .await
        }

        async fn find_recent(&self, limit: u64) -> DomainResult<Vec<Product>> {
            self.inner.products().find_recent(limit).await
        }

        async fn find_all(&self) -> DomainResult<Vec<Product>> {
            self.inner.products().find_all().await
        }

        async fn count(&self) -> DomainResult<u64> {
            self.inner.products().count().await
        }

        async fn count_in_category(&self, category_id: i32) -> DomainResult<u64> {
            self.inner.products().count_in_category(category_id).await
        }

        async fn save(&self, product: NewProduct) -> DomainResult<Product> {
            self.inner.products().save(product).await
        }

        async fn update(&self, id: i32, product: NewProduct) -> DomainResult<Product> {
            self.inner.products().update(id, product).await
        }

        async fn delete(&self, id: i32) -> DomainResult<()> {
            self.inner.products().delete(id).await
        }
    }

    struct GatedRepos {
        inner: Arc<InMemoryRepositoryProvider>,
        products: GatedProducts,
    }

    impl GatedRepos {
        fn new(inner: Arc<InMemoryRepositoryProvider>) -> Self {
            Self {
                products: GatedProducts {
                    inner: inner.clone(),
                    armed: AtomicBool::new(false),
                    entered: Notify::new(),
                    release: Notify::new(),
                },
                inner,
            }
        }
    }

    impl RepositoryProvider for GatedRepos {
        fn categories(&self) -> &dyn CategoryRepository {
            self.inner.categories()
        }

        fn products(&self) -> &dyn ProductRepository {
            &self.products
        }
    }

    async fn seeded() -> (Arc<InMemoryRepositoryProvider>, i32) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let category = repos
            .categories()
            .save(NewCategory {
                name: "Floor Tiles".into(),
                description: None,
                image: None,
            })
            .await
            .unwrap();
        for n in 0..3 {
            add_product(&repos, category.id, n).await;
        }
        (repos, category.id)
    }

    async fn add_product(repos: &InMemoryRepositoryProvider, category_id: i32, n: i32) {
        repos
            .products()
            .save(NewProduct {
                name: format!("Tile {}", n),
                description: None,
                price: 1200,
                category_id,
                image: None,
            })
            .await
            .unwrap();
    }

    fn request() -> ListingRequest {
        ListingRequest::all(1, 20).unwrap()
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let (repos, category_id) = seeded().await;
        let cache = CachedListing::new(
            BalancedSampler::new(repos.clone()),
            Duration::from_secs(60),
        );

        let first = cache.list_items(request()).await.unwrap();
        add_product(&repos, category_id, 99).await;
        let second = cache.list_items(request()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.total, 3);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_recompute() {
        let (repos, category_id) = seeded().await;
        let cache = CachedListing::new(
            BalancedSampler::new(repos.clone()),
            Duration::from_secs(60),
        );

        cache.list_items(request()).await.unwrap();
        add_product(&repos, category_id, 99).await;
        cache.invalidate();
        assert!(cache.is_empty());

        let fresh = cache.list_items(request()).await.unwrap();
        assert_eq!(fresh.total, 4);
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let (repos, category_id) = seeded().await;
        let cache = CachedListing::new(
            BalancedSampler::new(repos.clone()),
            Duration::from_millis(20),
        );

        cache.list_items(request()).await.unwrap();
        add_product(&repos, category_id, 99).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        let fresh = cache.list_items(request()).await.unwrap();
        assert_eq!(fresh.total, 4);
    }

    #[tokio::test]
    async fn zero_ttl_disables_caching() {
        let (repos, category_id) = seeded().await;
        let cache = CachedListing::new(BalancedSampler::new(repos.clone()), Duration::ZERO);
        assert!(!cache.is_enabled());

        cache.list_items(request()).await.unwrap();
        add_product(&repos, category_id, 99).await;
        let fresh = cache.list_items(request()).await.unwrap();

        assert_eq!(fresh.total, 4);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn explicit_and_daily_seed_share_an_entry() {
        let (repos, _) = seeded().await;
        let sampler = BalancedSampler::new(repos).with_clock(|| {
            chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        });
        let cache = CachedListing::new(sampler, Duration::from_secs(60));

        cache.list_items(request()).await.unwrap();
        cache
            .list_items(request().with_seed(20261018))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);

        cache.list_items(request().with_seed(7)).await.unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn page_computed_during_invalidate_is_not_kept() {
        let (repos, category_id) = seeded().await;
        let gated = Arc::new(GatedRepos::new(repos.clone()));
        let cache = Arc::new(CachedListing::new(
            BalancedSampler::new(gated.clone()),
            Duration::from_secs(60),
        ));

        gated.products.armed.store(true, Ordering::SeqCst);
        let in_flight = tokio::spawn({
            let cache = cache.clone();
            async move { cache.list_items(request()).await.unwrap() }
        });
        gated.products.entered.notified().await;

        add_product(&repos, category_id, 99).await;
        cache.invalidate();
        gated.products.release.notify_one();

        let stale = in_flight.await.unwrap();
        assert_eq!(stale.total, 3);
        assert!(cache.is_empty());

        let fresh = cache.list_items(request()).await.unwrap();
        assert_eq!(fresh.total, 4);
    }

    #[tokio::test]
    async fn entry_count_is_bounded() {
        let (repos, category_id) = seeded().await;
        let cache = CachedListing::new(
            BalancedSampler::new(repos.clone()),
            Duration::from_secs(60),
        )
        .with_max_entries(4);

        for seed in 0..50 {
            cache.list_items(request().with_seed(seed)).await.unwrap();
            assert!(cache.len() <= 4);
        }
        assert_eq!(cache.len(), 4);

        // The newest entry survives eviction and is still served
        add_product(&repos, category_id, 99).await;
        let cached = cache.list_items(request().with_seed(49)).await.unwrap();
        assert_eq!(cached.total, 3);
    }

    #[tokio::test]
    async fn expired_entries_are_swept_before_evicting() {
        let (repos, _) = seeded().await;
        let cache = CachedListing::new(
            BalancedSampler::new(repos.clone()),
            Duration::from_millis(20),
        )
        .with_max_entries(2);

        cache.list_items(request().with_seed(1)).await.unwrap();
        cache.list_items(request().with_seed(2)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        cache.list_items(request().with_seed(3)).await.unwrap();
        assert_eq!(cache.len(), 1);
    }
}
