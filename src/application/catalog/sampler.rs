//! Category-balanced product sampler
//!
//! Serves the storefront listing. A specific category is paginated by id;
//! "all categories" draws a balanced, seeded random sample so the front page
//! is fair across categories and stable for the whole (UTC) day.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::domain::listing::{
    allocate_slots, daily_seed, draw_without_replacement, CategorySelector, ListingRequest,
};
use crate::domain::{DomainResult, Product, RepositoryProvider};
use crate::shared::pagination::{page_offset, PaginatedResult};

/// Something that can produce a storefront listing page.
#[async_trait]
pub trait ProductListing: Send + Sync {
    async fn list_items(&self, request: ListingRequest) -> DomainResult<PaginatedResult<Product>>;

    /// Drop anything derived from the current catalog contents. Called after
    /// every product or category mutation.
    fn invalidate(&self);
}

/// Reads the catalog through the repositories on every call. Holds no cache.
pub struct BalancedSampler {
    repos: Arc<dyn RepositoryProvider>,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl BalancedSampler {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            today: utc_today,
        }
    }

    /// Replace the calendar used for the daily seed.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// The caller's seed, or today's date seed.
    pub fn resolve_seed(&self, request: &ListingRequest) -> u64 {
        request.seed.unwrap_or_else(|| daily_seed((self.today)()))
    }

    async fn list_category(
        &self,
        category_id: i32,
        request: &ListingRequest,
    ) -> DomainResult<PaginatedResult<Product>> {
        let (items, total) = self
            .repos
            .products()
            .find_page(
                Some(category_id),
                page_offset(request.page, request.page_size),
                request.page_size as u64,
            )
            .await?;
        Ok(PaginatedResult::new(
            items,
            total,
            request.page,
            request.page_size,
        ))
    }

    async fn list_balanced(
        &self,
        request: &ListingRequest,
    ) -> DomainResult<PaginatedResult<Product>> {
        let products = self.repos.products();

        let counts = products.count_by_category().await?;
        let allocation = allocate_slots(&counts, request.page_size);
        if allocation.is_empty() {
            return Ok(PaginatedResult::empty(request.page, request.page_size));
        }
        let total: u64 = counts.iter().map(|c| c.product_count).sum();

        let seed = self.resolve_seed(request);
        // Every page draws from the same seed, so later pages repeat the sample.
        let mut rng = StdRng::seed_from_u64(seed);

        let granted: usize = allocation.iter().map(|s| s.granted as usize).sum();
        let mut selected: Vec<i32> = Vec::with_capacity(granted);
        for slot in allocation.iter().filter(|s| s.granted > 0) {
            let ids = products.ids_by_category(slot.category_id).await?;
            // The category may have shrunk since it was counted
            let drawn = draw_without_replacement(&mut rng, &ids, slot.granted as usize);
            selected.extend(drawn);
        }
        selected.shuffle(&mut rng);

        let mut seen = HashSet::with_capacity(selected.len());
        selected.retain(|id| seen.insert(*id));
        selected.truncate(request.page_size as usize);

        let mut by_id: HashMap<i32, Product> = products
            .find_by_ids(&selected)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let items: Vec<Product> = selected.iter().filter_map(|id| by_id.remove(id)).collect();

        debug!(
            seed,
            page = request.page,
            categories = allocation.len(),
            drawn = items.len(),
            total,
            "Balanced listing sampled"
        );

        Ok(PaginatedResult::new(
            items,
            total,
            request.page,
            request.page_size,
        ))
    }
}

#[async_trait]
impl ProductListing for BalancedSampler {
    async fn list_items(&self, request: ListingRequest) -> DomainResult<PaginatedResult<Product>> {
        match request.selector {
            CategorySelector::Category(category_id) => {
                self.list_category(category_id, &request).await
            }
            CategorySelector::All => self.list_balanced(&request).await,
        }
    }

    fn invalidate(&self) {}
}
