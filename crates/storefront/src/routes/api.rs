//! JSON API handlers.
//!
//! Mirrors the HTML listing so client-side "load more" can append pages
//! using `nextToken`.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use elegant_closet_core::catalog::{Facets, LoadState};
use elegant_closet_core::models::Product;
use elegant_closet_core::types::CurrencyCode;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

use super::listing::ListingParams;
use super::{CurrencyQuery, parse_currency};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views::{PriceView, ProductCard};

/// A product tile as JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub slug: String,
    pub name: String,
    pub image_url: String,
    pub image_alt: String,
    pub price: PriceView,
    pub in_stock: bool,
    pub is_new: bool,
}

impl From<ProductCard> for ProductSummary {
    fn from(card: ProductCard) -> Self {
        Self {
            slug: card.slug,
            name: card.name,
            image_url: card.image_url,
            image_alt: card.image_alt,
            price: card.price,
            in_stock: card.in_stock,
            is_new: card.is_new,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub items: Vec<ProductSummary>,
    /// Pass back as `after` to load the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    /// Set when the store could not apply the requested sort.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<String>,
    pub facets: Facets,
    pub loaded: usize,
    pub state: LoadState,
    pub currency: CurrencyCode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub display_price: PriceView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesResponse {
    pub base: CurrencyCode,
    pub rates: BTreeMap<CurrencyCode, Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    pub source: String,
    pub stale: bool,
    pub available: Vec<CurrencyCode>,
}

/// `GET /api/products`
///
/// # Errors
///
/// Returns 400 for malformed filter parameters or cursor.
#[instrument(skip(state, params))]
pub async fn products(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingResponse>> {
    let currency = parse_currency(params.currency.as_deref())?;
    let tree = state.catalog().categories().await?;
    let filters = params.filter_state(&tree, None)?;
    let listing = state.catalog().listing(&filters, params.cursor()?).await?;
    let rates = state.catalog().rates().await?;

    Ok(Json(ListingResponse {
        items: ProductCard::all(&listing.products, currency, &rates.table)
            .into_iter()
            .map(ProductSummary::from)
            .collect(),
        next_token: listing.next_token,
        degradation: listing.degradation.map(|d| d.message()),
        facets: listing.facets,
        loaded: listing.loaded,
        state: listing.state,
        currency,
    }))
}

/// `GET /api/products/{slug}`
///
/// # Errors
///
/// Returns 404 if no published product has this slug.
#[instrument(skip(state, query))]
pub async fn product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<ProductResponse>> {
    let currency = parse_currency(query.currency.as_deref())?;
    let product = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound(slug))?;
    let rates = state.catalog().rates().await?;

    Ok(Json(ProductResponse {
        display_price: PriceView::new(&product, currency, &rates.table),
        product,
    }))
}

/// `GET /api/categories`: the navigation tree.
///
/// # Errors
///
/// Returns a store error.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryNode>>> {
    let tree = state.catalog().categories().await?;
    let nodes = tree
        .menu()
        .into_iter()
        .map(|entry| CategoryNode {
            id: entry.category.id.to_string(),
            name: entry.category.name.clone(),
            slug: entry.category.slug.clone(),
            children: entry
                .children
                .iter()
                .map(|child| CategoryNode {
                    id: child.id.to_string(),
                    name: child.name.clone(),
                    slug: child.slug.clone(),
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect();
    Ok(Json(nodes))
}

/// `GET /api/rates`
///
/// # Errors
///
/// Returns a store error.
pub async fn rates(State(state): State<AppState>) -> Result<Json<RatesResponse>> {
    let rates = state.catalog().rates().await?;
    let table = &rates.table;
    Ok(Json(RatesResponse {
        base: table.base,
        rates: table.rates.clone(),
        fetched_at: table.fetched_at,
        source: table.source.clone(),
        stale: rates.stale,
        available: table.available(),
    }))
}
