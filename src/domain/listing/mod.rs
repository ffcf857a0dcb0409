//! Product listing rules
//!
//! Request parsing and the category-balanced slot allocation used by the
//! "all categories" storefront listing.

pub mod balance;
pub mod request;

pub use balance::{allocate_slots, daily_seed, draw_without_replacement, SlotAllocation};
pub use request::{CategorySelector, ListingRequest, DEFAULT_PAGE_SIZE};
