//! Catalog backends. Implement the repository ports.

pub mod json_catalog;
pub mod memory_catalog;

pub use json_catalog::JsonCatalog;
pub use memory_catalog::{CatalogSnapshot, InMemoryCatalog};
