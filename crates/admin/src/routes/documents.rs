//! CRUD routes shared by every managed collection.
//!
//! ```text
//! GET    /api/{collection}        - List in admin order
//! POST   /api/{collection}        - Create (201)
//! GET    /api/{collection}/{id}   - Fetch one
//! PUT    /api/{collection}/{id}   - Overwrite
//! DELETE /api/{collection}/{id}   - Delete (204)
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::services::documents::{self, Managed};
use crate::state::AppState;

/// CRUD router for one collection, mounted at `/api/{collection}`.
pub fn router<T: Managed>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/{id}", get(show::<T>).put(update::<T>).delete(remove::<T>))
}

#[instrument(skip_all, fields(collection = T::COLLECTION))]
async fn list<T: Managed>(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<Vec<T>>> {
    Ok(Json(documents::list(state.store()).await?))
}

#[instrument(skip_all, fields(collection = T::COLLECTION, %id))]
async fn show<T: Managed>(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>> {
    Ok(Json(documents::fetch(state.store(), &id).await?))
}

#[instrument(skip_all, fields(collection = T::COLLECTION))]
async fn create<T: Managed>(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Json(doc): Json<T>,
) -> Result<(StatusCode, Json<T>)> {
    let saved = documents::create(state.store(), doc).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip_all, fields(collection = T::COLLECTION, %id))]
async fn update<T: Managed>(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(doc): Json<T>,
) -> Result<Json<T>> {
    Ok(Json(documents::update(state.store(), &id, doc).await?))
}

#[instrument(skip_all, fields(collection = T::COLLECTION, %id))]
async fn remove<T: Managed>(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    documents::remove::<T, _>(state.store(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
