//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Database reachable
//!
//! # Every /api route requires `Authorization: Bearer <ADMIN_API_TOKEN>`
//!
//! # Collections (list, create, fetch, overwrite, delete)
//! /api/products, /api/categories, /api/faqs, /api/colors, /api/sizes
//!
//! # Products with images
//! POST /api/products/upload            - Multipart create, uploads first
//! POST /api/uploads                    - Upload files, return URLs
//!
//! # Singletons
//! GET|PUT /api/settings/{hero,contact,about}
//!
//! # Exchange rates
//! GET  /api/rates
//! POST /api/rates/refresh
//!
//! # Contact messages
//! GET    /api/messages
//! PATCH  /api/messages/{id}
//! DELETE /api/messages/{id}
//!
//! # Dashboard
//! GET  /api/dashboard
//! ```

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use elegant_closet_core::models::{Category, ColorOption, Faq, Product, SizeOption};

use crate::services::uploads::MAX_UPLOAD_BYTES;
use crate::state::AppState;

pub mod dashboard;
pub mod documents;
pub mod messages;
pub mod products;
pub mod rates;
pub mod settings;

/// Largest multipart body: a handful of images at the per-file limit.
const MAX_MULTIPART_BYTES: usize = MAX_UPLOAD_BYTES * 10;

/// Upload routes, with the raised body limit.
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/products/upload", post(products::create_with_images))
        .route("/uploads", post(products::upload))
        .layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(upload_routes())
        .nest("/products", documents::router::<Product>())
        .nest("/categories", documents::router::<Category>())
        .nest("/faqs", documents::router::<Faq>())
        .nest("/colors", documents::router::<ColorOption>())
        .nest("/sizes", documents::router::<SizeOption>())
        .nest("/settings", settings::router())
        .nest("/messages", messages::router())
        .route("/rates", get(rates::show))
        .route("/rates/refresh", post(rates::refresh))
        .route("/dashboard", get(dashboard::show))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}
