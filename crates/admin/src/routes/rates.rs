//! Exchange-rate routes.

use axum::{Json, extract::State};
use elegant_closet_core::catalog::RateTable;
use elegant_closet_core::store::get_singleton;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::services::rates;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesView {
    #[serde(flatten)]
    pub table: RateTable,
    pub stale: bool,
    pub is_default: bool,
}

impl RatesView {
    fn new(table: RateTable, state: &AppState) -> Self {
        let stale = table.is_stale(chrono::Utc::now(), state.config().rates_ttl());
        let is_default = table.is_default();
        Self {
            table,
            stale,
            is_default,
        }
    }
}

/// `GET /api/rates`
#[instrument(skip_all)]
pub async fn show(_auth: RequireAdminToken, State(state): State<AppState>) -> Result<Json<RatesView>> {
    let table: RateTable = get_singleton(state.store()).await?;
    Ok(Json(RatesView::new(table, &state)))
}

/// `POST /api/rates/refresh`
#[instrument(skip_all)]
pub async fn refresh(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<RatesView>> {
    let table = rates::refresh(
        state.http(),
        state.store(),
        &state.config().exchange_rate_api_url,
    )
    .await?;
    Ok(Json(RatesView::new(table, &state)))
}
