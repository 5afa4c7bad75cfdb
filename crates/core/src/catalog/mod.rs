//! Catalog presentation pipeline.
//!
//! ```text
//! fetch (store query, ordered -> unordered fallback)
//!   -> facets (over the loaded list)
//!   -> filter + sort (client-side predicates)
//!   -> currency projection
//!   -> pagination (cursor tracker)
//! ```
//!
//! Everything here is a pure function or a small state holder; the only
//! I/O is the [`DocumentStore`](crate::store::DocumentStore) call inside
//! [`fetch`].

pub mod categories;
pub mod currency;
pub mod discount;
pub mod facets;
pub mod fetch;
pub mod filter;
pub mod pagination;
pub mod whatsapp;

pub use categories::{CategoryTree, MenuEntry};
pub use currency::{CurrencyError, RateTable};
pub use facets::{Facets, extract_facets};
pub use fetch::{Degradation, Page, QueryStrategy, collect_pages, fetch_page};
pub use filter::{
    Effect, FilterAction, FilterCriteria, FilterState, PriceRange, SortOrder, filter_products,
    sort_products,
};
pub use pagination::{LoadKind, LoadState, PageTracker, Ticket};
