//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (hero, featured, new arrivals)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /products               - Product listing (filters, sort, currency, load more)
//! GET  /products/{slug}        - Product detail with WhatsApp order link
//! GET  /categories/{slug}      - Category listing
//!
//! # Pages
//! GET  /faqs                   - FAQs grouped by category
//! GET  /about                  - About page
//! GET  /contact                - Contact details and form
//! POST /contact                - Submit contact form (rate limited)
//!
//! # JSON API
//! GET  /api/products           - Listing page as JSON
//! GET  /api/products/{slug}    - One product as JSON
//! GET  /api/categories         - Navigation tree
//! GET  /api/rates              - Exchange-rate table and staleness
//! ```

pub mod api;
pub mod categories;
pub mod contact;
pub mod home;
pub mod listing;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use elegant_closet_core::catalog::whatsapp;
use elegant_closet_core::types::CurrencyCode;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::{api_rate_limiter, contact_rate_limiter};
use crate::services::Rates;
use crate::state::AppState;
use crate::views::{Chrome, currency_options, menu_links};

/// The `currency` query parameter on pages without other parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CurrencyQuery {
    #[serde(default)]
    pub currency: Option<String>,
}

/// Greeting used for the site-wide WhatsApp button.
const WHATSAPP_GREETING: &str = "Hi Elegant Closet! I have a question.";

/// Parse the `currency` query parameter, defaulting to the base currency.
///
/// # Errors
///
/// Returns `BadRequest` for an unsupported code.
pub fn parse_currency(raw: Option<&str>) -> Result<CurrencyCode> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(CurrencyCode::BASE),
        Some(code) => code.parse().map_err(AppError::BadRequest),
    }
}

/// The WhatsApp number from contact settings, or the configured fallback.
///
/// # Errors
///
/// Returns a store error.
pub async fn whatsapp_number(state: &AppState) -> Result<Option<String>> {
    let contact = state.catalog().contact().await?;
    Ok(Some(contact.whatsapp_number.trim())
        .filter(|n| !n.is_empty())
        .map(String::from)
        .or_else(|| state.config().catalog.whatsapp_number.clone()))
}

/// Build the layout data shared by every page.
///
/// # Errors
///
/// Returns a store error.
pub async fn chrome(state: &AppState, currency: CurrencyCode, rates: &Rates) -> Result<Chrome> {
    let tree = state.catalog().categories().await?;
    let whatsapp_link = whatsapp_number(state)
        .await?
        .and_then(|number| whatsapp::deep_link(&number, WHATSAPP_GREETING))
        .unwrap_or_default();

    Ok(Chrome {
        menu: menu_links(&tree),
        currencies: currency_options(&rates.table, currency),
        currency: currency.code().to_string(),
        rates_stale: rates.stale,
        whatsapp_link,
    })
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/categories/{slug}", get(categories::show))
}

/// Create the content page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/faqs", get(pages::faqs))
        .route("/about", get(pages::about))
        .route(
            "/contact",
            get(contact::show).merge(post(contact::submit).layer(contact_rate_limiter())),
        )
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::products))
        .route("/products/{slug}", get(api::product))
        .route("/categories", get(api::categories))
        .route("/rates", get(api::rates))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(catalog_routes())
        .merge(page_routes())
        .nest("/api", api_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency(None).unwrap(), CurrencyCode::LKR);
        assert_eq!(parse_currency(Some("")).unwrap(), CurrencyCode::LKR);
        assert_eq!(parse_currency(Some("usd")).unwrap(), CurrencyCode::USD);
        assert!(matches!(
            parse_currency(Some("XYZ")),
            Err(AppError::BadRequest(_))
        ));
    }
}
