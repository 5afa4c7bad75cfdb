//! Dashboard route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::services::dashboard::{self, Dashboard};
use crate::state::AppState;

/// `GET /api/dashboard`
#[instrument(skip_all)]
pub async fn show(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<Dashboard>> {
    let ttl = state.config().rates_ttl();
    Ok(Json(dashboard::load(state.store(), ttl).await?))
}
