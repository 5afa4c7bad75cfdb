//! Business logic services for storefront.
//!
//! - `catalog` - Listings, product pages and cached site documents
//! - `cache` - `moka` cache keys and values

pub mod cache;
pub mod catalog;

pub use catalog::{CatalogService, Listing, Rates};
