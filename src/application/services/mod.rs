//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (CatalogClient, StudentStore)
//! but are themselves concrete structs, not traits.

mod catalog;
mod fetcher;
mod student;

pub use catalog::{CatalogService, FetchDepth};
pub use fetcher::TreeFetcher;
pub use student::StudentService;
