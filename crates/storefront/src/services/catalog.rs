//! Catalog reads for the storefront.
//!
//! Wraps a [`DocumentStore`] with the listing pipeline and caches site-wide
//! documents (categories, rates, hero, contact, about, FAQs) in `moka` for
//! five minutes.
//!
//! Generic over the store so the same code runs against Postgres in the
//! binary and the in-memory store in tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use elegant_closet_core::catalog::{
    CategoryTree, Degradation, Facets, FilterState, LoadState, PageTracker, PriceRange, RateTable,
    extract_facets, fetch_page, filter_products, sort_products,
};
use elegant_closet_core::models::{
    About, Category, ContactSettings, Faq, HeroSettings, NewContactMessage, Product,
};
use elegant_closet_core::store::{
    Cursor, Document, DocumentStore, Query, SortKey, StoreError, find_singleton, get_singleton,
    query_documents, save_document,
};
use elegant_closet_core::types::{MessageId, ProductId, ProductStatus};
use moka::future::Cache;
use tracing::{debug, error, info, instrument, warn};

use super::cache::{CacheKey, CacheValue};
use crate::error::Result;

/// Products shown in each home page strip.
const HOME_STRIP_SIZE: usize = 8;

/// Related products shown under a product.
const RELATED_COUNT: usize = 4;

/// One rendered listing page.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Products passing the client-side filters, in display order.
    pub products: Vec<Product>,
    /// Records loaded from the store before filtering.
    pub loaded: usize,
    /// Colors and sizes across the loaded records.
    pub facets: Facets,
    /// Base-price span of the loaded records.
    pub price_bounds: Option<PriceRange>,
    /// Token for the next page, when the last batch was full.
    pub next_token: Option<String>,
    pub degradation: Option<Degradation>,
    pub state: LoadState,
}

/// The current rate table and whether it is past its TTL.
#[derive(Debug, Clone)]
pub struct Rates {
    pub table: Arc<RateTable>,
    pub stale: bool,
}

/// Storefront catalog service.
#[derive(Clone)]
pub struct CatalogService<S> {
    store: S,
    cache: Cache<CacheKey, CacheValue>,
    page_size: usize,
    rates_ttl: chrono::Duration,
}

impl<S: DocumentStore + Clone + 'static> CatalogService<S> {
    /// Create a catalog service.
    #[must_use]
    pub fn new(store: S, page_size: usize, rates_ttl: chrono::Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self {
            store,
            cache,
            page_size,
            rates_ttl,
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Drop every cached document.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Load one listing page and run the client-side stages over it.
    ///
    /// Store failures other than a bad cursor are logged and produce an
    /// empty listing in the `Failed` state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCursor`] for a cursor the store rejects.
    #[instrument(skip(self, filters, after), fields(sort = %filters.sort))]
    pub async fn listing(&self, filters: &FilterState, after: Option<Cursor>) -> Result<Listing> {
        let mut query = filters.remote_query(self.page_size);
        if let Some(cursor) = after {
            query = query.start_after(cursor);
        }

        let mut tracker = PageTracker::new();
        let ticket = tracker.begin_initial();
        let mut degradation = None;
        match fetch_page::<Product, S>(&self.store, &query).await {
            Ok(page) => {
                degradation.clone_from(&page.degradation);
                tracker.complete(ticket, page);
            }
            Err(err @ StoreError::InvalidCursor(_)) => return Err(err.into()),
            Err(err) => {
                error!(error = %err, query = %query, "Product listing failed");
                tracker.fail(ticket, err.to_string());
            }
        }

        let items = tracker.items();
        let mut products = filter_products(items, &filters.criteria);
        if degradation.is_some() {
            // The unordered tier returns id order.
            sort_products(&mut products, filters.sort);
        }
        debug!(
            loaded = items.len(),
            shown = products.len(),
            "Listing filtered"
        );

        let next_token = if tracker.has_more() {
            tracker.cursor().map(Cursor::encode)
        } else {
            None
        };

        Ok(Listing {
            products: products.into_iter().cloned().collect(),
            loaded: items.len(),
            facets: extract_facets(items),
            price_bounds: PriceRange::spanning(items),
            next_token,
            degradation,
            state: tracker.state().clone(),
        })
    }

    /// Newest published products for the home page.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn new_arrivals(&self) -> Result<Vec<Product>> {
        let query = published()
            .order_by(SortKey::desc("createdAt"))
            .limit(HOME_STRIP_SIZE);
        self.newest_first(&query).await
    }

    /// Featured published products, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn featured(&self) -> Result<Vec<Product>> {
        let query = published()
            .where_eq("featured", true)
            .order_by(SortKey::desc("createdAt"))
            .limit(HOME_STRIP_SIZE);
        self.newest_first(&query).await
    }

    async fn newest_first(&self, query: &Query) -> Result<Vec<Product>> {
        let page = fetch_page::<Product, S>(&self.store, query).await?;
        let mut items = page.items;
        if page.degradation.is_some() {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(items)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// A published product by slug.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let query = published().where_eq("slug", slug).limit(1);
        let products: Vec<Product> = query_documents(&self.store, &query).await?;
        Ok(products.into_iter().next())
    }

    /// Other published products in the same category.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn related(&self, product: &Product) -> Result<Vec<Product>> {
        let query = published()
            .where_eq("categoryId", product.category_id.as_str())
            .limit(RELATED_COUNT + 1);
        let products: Vec<Product> = query_documents(&self.store, &query).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(RELATED_COUNT)
            .collect())
    }

    /// Bump a product's view counter in the background.
    ///
    /// The request does not wait for the write, and a failure is only logged.
    pub fn record_view(&self, id: &ProductId) {
        let store = self.store.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            if let Err(err) = store.increment(Product::COLLECTION, &id, "viewCount", 1).await {
                warn!(product_id = %id, error = %err, "Failed to record product view");
            }
        });
    }

    // =========================================================================
    // Site-wide documents (cached)
    // =========================================================================

    /// All categories as a tree.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn categories(&self) -> Result<Arc<CategoryTree>> {
        if let Some(CacheValue::Categories(tree)) = self.cache.get(&CacheKey::Categories).await {
            return Ok(tree);
        }
        let categories: Vec<Category> =
            query_documents(&self.store, &Query::new(Category::COLLECTION)).await?;
        let tree = Arc::new(CategoryTree::new(categories));
        self.cache
            .insert(CacheKey::Categories, CacheValue::Categories(Arc::clone(&tree)))
            .await;
        Ok(tree)
    }

    /// The exchange-rate table, or the built-in defaults if none was saved.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn rates(&self) -> Result<Rates> {
        let table = if let Some(CacheValue::Rates(table)) = self.cache.get(&CacheKey::Rates).await
        {
            table
        } else {
            let table = Arc::new(find_singleton::<RateTable, S>(&self.store).await?.unwrap_or_else(
                || {
                    info!("No saved exchange rates, using defaults");
                    RateTable::defaults()
                },
            ));
            if table.is_stale(Utc::now(), self.rates_ttl) {
                warn!(
                    fetched_at = ?table.fetched_at,
                    ttl_hours = self.rates_ttl.num_hours(),
                    "Exchange rates are stale"
                );
            }
            self.cache
                .insert(CacheKey::Rates, CacheValue::Rates(Arc::clone(&table)))
                .await;
            table
        };
        let stale = table.is_stale(Utc::now(), self.rates_ttl);
        Ok(Rates { table, stale })
    }

    /// # Errors
    ///
    /// Returns a store error.
    pub async fn hero(&self) -> Result<Arc<HeroSettings>> {
        if let Some(CacheValue::Hero(hero)) = self.cache.get(&CacheKey::Hero).await {
            return Ok(hero);
        }
        let hero = Arc::new(get_singleton::<HeroSettings, S>(&self.store).await?);
        self.cache
            .insert(CacheKey::Hero, CacheValue::Hero(Arc::clone(&hero)))
            .await;
        Ok(hero)
    }

    /// # Errors
    ///
    /// Returns a store error.
    pub async fn contact(&self) -> Result<Arc<ContactSettings>> {
        if let Some(CacheValue::Contact(contact)) = self.cache.get(&CacheKey::Contact).await {
            return Ok(contact);
        }
        let contact = Arc::new(get_singleton::<ContactSettings, S>(&self.store).await?);
        self.cache
            .insert(CacheKey::Contact, CacheValue::Contact(Arc::clone(&contact)))
            .await;
        Ok(contact)
    }

    /// # Errors
    ///
    /// Returns a store error.
    pub async fn about(&self) -> Result<Arc<About>> {
        if let Some(CacheValue::About(about)) = self.cache.get(&CacheKey::About).await {
            return Ok(about);
        }
        let about = Arc::new(get_singleton::<About, S>(&self.store).await?);
        self.cache
            .insert(CacheKey::About, CacheValue::About(Arc::clone(&about)))
            .await;
        Ok(about)
    }

    /// Published FAQs.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn faqs(&self) -> Result<Arc<Vec<Faq>>> {
        if let Some(CacheValue::Faqs(faqs)) = self.cache.get(&CacheKey::Faqs).await {
            return Ok(faqs);
        }
        let query = Query::new(Faq::COLLECTION).where_eq("published", true);
        let faqs = Arc::new(query_documents::<Faq, S>(&self.store, &query).await?);
        self.cache
            .insert(CacheKey::Faqs, CacheValue::Faqs(Arc::clone(&faqs)))
            .await;
        Ok(faqs)
    }

    // =========================================================================
    // Contact form
    // =========================================================================

    /// Validate and store a contact form submission.
    ///
    /// # Errors
    ///
    /// Returns the failing fields, or a store error.
    #[instrument(skip(self, form))]
    pub async fn submit_contact(&self, form: NewContactMessage) -> Result<MessageId> {
        let mut message = form.into_message(Utc::now())?;
        let id = save_document(&self.store, &mut message).await?;
        info!(message_id = %id, "Contact message received");
        Ok(MessageId::new(id))
    }
}

/// Published products.
fn published() -> Query {
    Query::new(Product::COLLECTION).where_eq("status", ProductStatus::Published.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone};
    use elegant_closet_core::catalog::{FilterAction, SortOrder};
    use elegant_closet_core::store::{CompositeIndex, IndexRegistry, InMemoryStore, save_singleton};
    use elegant_closet_core::types::CategoryId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::error::AppError;

    fn product(i: u32, price: i64, color: &str, sale: Option<i64>) -> Product {
        Product {
            id: ProductId::new(format!("p{i:02}")),
            name: format!("Dress {i}"),
            slug: format!("dress-{i}"),
            price: Decimal::from(price),
            sale_price: sale.map(Decimal::from),
            colors: vec![color.to_string()],
            sizes: vec!["M".to_string()],
            category_id: CategoryId::new("dresses"),
            status: ProductStatus::Published,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, i).unwrap(),
            ..Product::default()
        }
    }

    async fn service(indexes: IndexRegistry, page_size: usize) -> CatalogService<InMemoryStore> {
        let store = InMemoryStore::with_indexes(indexes);
        let rows = [
            product(1, 4500, "Red", Some(3500)),
            product(2, 1800, "Blue", None),
            product(3, 2500, "red", None),
            product(4, 3200, "Red", Some(0)),
            product(5, 5200, "Green", None),
        ];
        for mut p in rows {
            save_document(&store, &mut p).await.unwrap();
        }
        CatalogService::new(store, page_size, ChronoDuration::hours(24))
    }

    fn price_index() -> IndexRegistry {
        IndexRegistry::new(vec![CompositeIndex::new("products", &["status"], "price")])
    }

    #[tokio::test]
    async fn test_listing_filters_loaded_page() {
        let catalog = service(price_index(), 10).await;
        let mut filters = FilterState::default();
        filters.apply(FilterAction::SetSort(SortOrder::PriceAsc));
        filters.apply(FilterAction::ToggleColor("Red".to_string()));

        let listing = catalog.listing(&filters, None).await.unwrap();
        assert_eq!(listing.loaded, 5);
        let ids: Vec<&str> = listing.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p04", "p01"]);
        assert_eq!(listing.facets.colors, vec!["Blue", "red", "Red", "Green"]);
        assert!(listing.degradation.is_none());
        assert!(listing.next_token.is_none());
        assert_eq!(listing.state, LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_listing_degrades_and_sorts_locally() {
        let catalog = service(IndexRegistry::default(), 10).await;
        let filters = FilterState {
            sort: SortOrder::PriceDesc,
            ..FilterState::default()
        };
        let listing = catalog.listing(&filters, None).await.unwrap();
        assert!(listing.degradation.is_some());
        let prices: Vec<Decimal> = listing.products.iter().map(|p| p.price).collect();
        let mut expected = prices.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(prices, expected);
    }

    #[tokio::test]
    async fn test_listing_next_token_continues() {
        let catalog = service(price_index(), 2).await;
        let filters = FilterState {
            sort: SortOrder::PriceAsc,
            ..FilterState::default()
        };
        let first = catalog.listing(&filters, None).await.unwrap();
        assert_eq!(first.products.len(), 2);
        let token = first.next_token.unwrap();

        let second = catalog
            .listing(&filters, Some(Cursor::decode(&token).unwrap()))
            .await
            .unwrap();
        let first_ids: Vec<&ProductId> = first.products.iter().map(|p| &p.id).collect();
        assert!(second.products.iter().all(|p| !first_ids.contains(&&p.id)));
        assert_eq!(second.products.len(), 2);
    }

    #[tokio::test]
    async fn test_listing_sale_only() {
        let catalog = service(price_index(), 10).await;
        let mut filters = FilterState::default();
        filters.apply(FilterAction::SetSaleOnly(true));
        let listing = catalog.listing(&filters, None).await.unwrap();
        let ids: Vec<&str> = listing.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p01"]);
    }

    #[tokio::test]
    async fn test_product_by_slug_and_related() {
        let catalog = service(price_index(), 10).await;
        let product = catalog.product_by_slug("dress-3").await.unwrap().unwrap();
        assert_eq!(product.id.as_str(), "p03");
        assert!(catalog.product_by_slug("missing").await.unwrap().is_none());

        let related = catalog.related(&product).await.unwrap();
        assert_eq!(related.len(), RELATED_COUNT);
        assert!(related.iter().all(|p| p.id != product.id));
    }

    #[tokio::test]
    async fn test_rates_default_and_stale() {
        let catalog = service(IndexRegistry::default(), 10).await;
        let rates = catalog.rates().await.unwrap();
        assert!(rates.table.is_default());
        assert!(!rates.stale);

        let old = RateTable::from_rates(
            [(elegant_closet_core::types::CurrencyCode::USD, Decimal::new(34, 4))],
            Utc::now() - ChronoDuration::hours(48),
            "test",
        );
        save_singleton(catalog.store(), &old).await.unwrap();
        catalog.invalidate();
        let rates = catalog.rates().await.unwrap();
        assert!(rates.stale);
        assert_eq!(rates.table.source, "test");
    }

    #[tokio::test]
    async fn test_submit_contact_validates() {
        let catalog = service(IndexRegistry::default(), 10).await;
        let err = catalog
            .submit_contact(NewContactMessage {
                name: "Nimali".to_string(),
                email: "not-an-email".to_string(),
                message: "Do you ship to Kandy?".to_string(),
                ..NewContactMessage::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.has("email")));

        let id = catalog
            .submit_contact(NewContactMessage {
                name: "Nimali".to_string(),
                email: "nimali@example.lk".to_string(),
                message: "Do you ship to Kandy?".to_string(),
                ..NewContactMessage::default()
            })
            .await
            .unwrap();
        assert!(!id.is_empty());
        assert_eq!(catalog.store().count("contact_messages"), 1);
    }
}
