//! Catalog health summary for the admin dashboard.

use chrono::{DateTime, Duration, Utc};
use elegant_closet_core::catalog::{RateTable, collect_pages};
use elegant_closet_core::catalog::discount::{derived_percentage, discount_percentage, has_drift};
use elegant_closet_core::catalog::facets::{extract_facets, near_duplicate_facets};
use elegant_closet_core::models::{Category, ContactMessage, Product};
use elegant_closet_core::store::{Document, DocumentStore, Query, StoreError, get_singleton};
use elegant_closet_core::types::{MessageStatus, ProductStatus};
use serde::Serialize;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCounts {
    pub total: usize,
    pub published: usize,
    pub draft: usize,
    pub archived: usize,
    pub out_of_stock: usize,
    pub on_sale: usize,
}

/// A product whose stored badge disagrees with its prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftedProduct {
    pub id: String,
    pub name: String,
    /// Percentage shown on the badge.
    pub shown: Option<u32>,
    pub derived: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesStatus {
    pub fetched_at: Option<DateTime<Utc>>,
    pub source: String,
    pub is_default: bool,
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub products: ProductCounts,
    pub categories: usize,
    pub new_messages: usize,
    pub discount_drift: Vec<DriftedProduct>,
    /// Facet values that differ only by case or spacing.
    pub duplicate_colors: Vec<Vec<String>>,
    pub duplicate_sizes: Vec<Vec<String>>,
    /// Products pointing at a category that no longer exists.
    pub orphaned_products: Vec<String>,
    pub rates: RatesStatus,
}

fn count_products(products: &[Product]) -> ProductCounts {
    let mut counts = ProductCounts {
        total: products.len(),
        ..ProductCounts::default()
    };
    for product in products {
        match product.status {
            ProductStatus::Published => counts.published += 1,
            ProductStatus::Draft => counts.draft += 1,
            ProductStatus::Archived => counts.archived += 1,
        }
        if !product.in_stock {
            counts.out_of_stock += 1;
        }
        if product.is_on_sale() {
            counts.on_sale += 1;
        }
    }
    counts
}

/// Build the summary from already-loaded documents.
#[must_use]
pub fn summarize(
    products: &[Product],
    categories: &[Category],
    new_messages: usize,
    rates: &RateTable,
    rates_ttl: Duration,
    now: DateTime<Utc>,
) -> Dashboard {
    let discount_drift = products
        .iter()
        .filter(|p| has_drift(p))
        .map(|p| DriftedProduct {
            id: p.id.to_string(),
            name: p.name.clone(),
            shown: discount_percentage(p),
            derived: p.sale_price.and_then(|sale| derived_percentage(p.price, sale)),
        })
        .collect();

    let facets = extract_facets(products);
    let orphaned_products = products
        .iter()
        .filter(|p| {
            let known = |id: &str| categories.iter().any(|c| c.id.as_str() == id);
            !known(p.category_id.as_str())
                || p.sub_category_id.as_ref().is_some_and(|sub| !known(sub.as_str()))
        })
        .map(|p| p.id.to_string())
        .collect();

    Dashboard {
        products: count_products(products),
        categories: categories.len(),
        new_messages,
        discount_drift,
        duplicate_colors: near_duplicate_facets(&facets.colors),
        duplicate_sizes: near_duplicate_facets(&facets.sizes),
        orphaned_products,
        rates: RatesStatus {
            fetched_at: rates.fetched_at,
            source: rates.source.clone(),
            is_default: rates.is_default(),
            stale: rates.is_stale(now, rates_ttl),
        },
    }
}

/// Documents read per round trip while loading the dashboard.
const LOAD_PAGE_SIZE: usize = 200;

/// Pages read per collection before the summary stops growing.
const LOAD_MAX_PAGES: usize = 50;

/// Load the collections and summarize them.
///
/// Products and categories are read in pages of [`LOAD_PAGE_SIZE`].
///
/// # Errors
///
/// Returns a store error.
pub async fn load<S: DocumentStore>(store: &S, rates_ttl: Duration) -> Result<Dashboard, StoreError> {
    let products_query = Query::new(Product::COLLECTION).limit(LOAD_PAGE_SIZE);
    let categories_query = Query::new(Category::COLLECTION).limit(LOAD_PAGE_SIZE);
    let new_messages_query =
        Query::new(ContactMessage::COLLECTION).where_eq("status", MessageStatus::New.as_str());

    let ((products, _), (categories, _), new_messages, rates) = tokio::try_join!(
        collect_pages::<Product, S>(store, &products_query, LOAD_MAX_PAGES),
        collect_pages::<Category, S>(store, &categories_query, LOAD_MAX_PAGES),
        store.query(&new_messages_query),
        get_singleton::<RateTable, S>(store),
    )?;
    Ok(summarize(
        products.items(),
        categories.items(),
        new_messages.len(),
        &rates,
        rates_ttl,
        Utc::now(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_closet_core::store::{InMemoryStore, save_document};
    use elegant_closet_core::types::CategoryId;
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, category: &str, colors: &[&str]) -> Product {
        Product {
            id: elegant_closet_core::types::ProductId::new(id),
            name: id.to_string(),
            slug: id.to_string(),
            price: Decimal::from(1000),
            category_id: CategoryId::new(category),
            colors: colors.iter().map(ToString::to_string).collect(),
            ..Product::default()
        }
    }

    #[test]
    fn test_summarize_flags_catalog_problems() {
        let categories = vec![Category {
            id: CategoryId::new("dresses"),
            name: "Dresses".to_string(),
            slug: "dresses".to_string(),
            ..Category::default()
        }];
        let mut drifted = product("a", "dresses", &["Red"]);
        drifted.sale_price = Some(Decimal::from(750));
        drifted.discount_percentage = Some(Decimal::from(30));
        let products = vec![
            drifted,
            product("b", "dresses", &["red ", "Blue"]),
            product("c", "gone", &[]),
        ];

        let dashboard = summarize(
            &products,
            &categories,
            2,
            &RateTable::defaults(),
            Duration::hours(24),
            Utc::now(),
        );
        assert_eq!(dashboard.products.total, 3);
        assert_eq!(dashboard.products.on_sale, 1);
        assert_eq!(dashboard.discount_drift.len(), 1);
        assert_eq!(dashboard.discount_drift[0].derived, Some(25));
        assert_eq!(dashboard.discount_drift[0].shown, Some(30));
        assert_eq!(
            dashboard.duplicate_colors,
            vec![vec!["Red".to_string(), "red ".to_string()]]
        );
        assert_eq!(dashboard.orphaned_products, vec!["c".to_string()]);
        assert!(dashboard.rates.is_default);
        assert!(!dashboard.rates.stale);
    }

    #[tokio::test]
    async fn test_load_reads_every_collection() {
        let store = InMemoryStore::default();
        for i in 0..3 {
            let mut doc = product(&format!("p{i}"), "dresses", &["Red"]);
            save_document(&store, &mut doc).await.unwrap();
        }
        let mut dresses = Category {
            id: CategoryId::new("dresses"),
            name: "Dresses".to_string(),
            slug: "dresses".to_string(),
            ..Category::default()
        };
        save_document(&store, &mut dresses).await.unwrap();

        let dashboard = load(&store, Duration::hours(24)).await.unwrap();
        assert_eq!(dashboard.products.total, 3);
        assert_eq!(dashboard.categories, 1);
        assert_eq!(dashboard.new_messages, 0);
        assert!(dashboard.orphaned_products.is_empty());
        assert!(dashboard.rates.is_default);
    }
}
