//! Category aggregate

pub mod model;
pub mod repository;

pub use model::{Category, CategoryCount, NewCategory};
pub use repository::CategoryRepository;
