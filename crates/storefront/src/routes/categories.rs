//! Category listing handler.

use axum::extract::{Path, Query, State};
use tracing::instrument;

use super::listing::ListingParams;
use super::products::{ListingTemplate, render_listing};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Display the listing for one category.
///
/// A top-level category lists everything under it; a sub-category lists
/// only its own products.
///
/// # Errors
///
/// Returns 404 for an unknown or hidden category.
#[instrument(skip(state, params))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ListingParams>,
) -> Result<ListingTemplate> {
    let tree = state.catalog().categories().await?;
    let category = tree
        .find_by_slug(&slug)
        .filter(|c| c.is_active())
        .ok_or_else(|| AppError::NotFound(slug.clone()))?;

    render_listing(
        &state,
        &params,
        &tree,
        Some(category),
        format!("/categories/{}", category.slug),
    )
    .await
}
