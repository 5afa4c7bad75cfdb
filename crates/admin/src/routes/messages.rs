//! Contact message routes.
//!
//! ```text
//! GET    /api/messages?status=new  - Newest first
//! PATCH  /api/messages/{id}        - Change status and/or priority
//! DELETE /api/messages/{id}
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use elegant_closet_core::models::{ContactMessage, MessageUpdate};
use elegant_closet_core::types::MessageStatus;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::services::messages;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    pub items: Vec<ContactMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", patch(triage).delete(remove))
}

#[instrument(skip_all)]
async fn list(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MessageList>> {
    let status = query
        .status
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<MessageStatus>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let (items, degradation) = messages::list(state.store(), status).await?;
    Ok(Json(MessageList {
        items,
        degradation: degradation.map(|d| d.message()),
    }))
}

#[instrument(skip_all, fields(%id))]
async fn triage(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<MessageUpdate>,
) -> Result<Json<ContactMessage>> {
    if update.status.is_none() && update.priority.is_none() {
        return Err(AppError::BadRequest(
            "expected status or priority".to_string(),
        ));
    }
    Ok(Json(messages::triage(state.store(), &id, &update).await?))
}

#[instrument(skip_all, fields(%id))]
async fn remove(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    messages::remove(state.store(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
