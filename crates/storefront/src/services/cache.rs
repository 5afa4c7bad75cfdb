//! Cache types for store reads.

use std::sync::Arc;

use elegant_closet_core::catalog::{CategoryTree, RateTable};
use elegant_closet_core::models::{About, ContactSettings, Faq, HeroSettings};

/// Cache key for site-wide documents.
///
/// Product listings are never cached; their cursors would go stale.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Rates,
    Hero,
    Contact,
    About,
    Faqs,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<CategoryTree>),
    Rates(Arc<RateTable>),
    Hero(Arc<HeroSettings>),
    Contact(Arc<ContactSettings>),
    About(Arc<About>),
    Faqs(Arc<Vec<Faq>>),
}
