//! Listing request parsing

use std::fmt;

use crate::shared::errors::DomainError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Which part of the catalog a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategorySelector {
    /// Balanced sample across every non-empty category
    All,
    /// Plain pagination within one category
    Category(i32),
}

impl CategorySelector {
    /// Parse the `category` query value. Anything that is not a category id
    /// (including a missing value) means "all categories".
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) => value
                .parse::<i32>()
                .map(Self::Category)
                .unwrap_or(Self::All),
            None => Self::All,
        }
    }
}

impl Default for CategorySelector {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Category(id) => write!(f, "{}", id),
        }
    }
}

/// A validated listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListingRequest {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub selector: CategorySelector,
    /// Caller-supplied seed; `None` means "derive from today's UTC date"
    pub seed: Option<u64>,
}

impl ListingRequest {
    /// Page numbers below 1 are clamped to 1. A page size of zero or less is
    /// rejected.
    pub fn new(
        page: i64,
        page_size: i64,
        selector: CategorySelector,
        seed: Option<u64>,
    ) -> Result<Self, DomainError> {
        if page_size <= 0 {
            return Err(DomainError::InvalidArgument(format!(
                "page size must be positive, got {}",
                page_size
            )));
        }
        let page_size = u32::try_from(page_size).map_err(|_| {
            DomainError::InvalidArgument(format!("page size {} is too large", page_size))
        })?;
        let page = page.clamp(1, u32::MAX as i64) as u32;

        Ok(Self {
            page,
            page_size,
            selector,
            seed,
        })
    }

    pub fn all(page: i64, page_size: i64) -> Result<Self, DomainError> {
        Self::new(page, page_size, CategorySelector::All, None)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
