//! Singleton settings routes.
//!
//! ```text
//! GET /api/settings/hero      PUT /api/settings/hero
//! GET /api/settings/contact   PUT /api/settings/contact
//! GET /api/settings/about     PUT /api/settings/about
//! ```
//!
//! A PUT replaces the whole document.

use axum::{Json, Router, extract::State, routing::get};
use elegant_closet_core::models::{About, ContactSettings, HeroSettings};
use elegant_closet_core::store::{Singleton, get_singleton, save_singleton};
use elegant_closet_core::validation::ValidationErrors;
use tracing::{info, instrument};

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// A singleton the admin can overwrite.
pub trait Setting: Singleton + 'static {
    /// # Errors
    ///
    /// Returns every failing field.
    fn check(&self) -> std::result::Result<(), ValidationErrors>;
}

impl Setting for HeroSettings {
    fn check(&self) -> std::result::Result<(), ValidationErrors> {
        self.validate()
    }
}

impl Setting for ContactSettings {
    fn check(&self) -> std::result::Result<(), ValidationErrors> {
        self.validate()
    }
}

impl Setting for About {
    fn check(&self) -> std::result::Result<(), ValidationErrors> {
        self.validate()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hero", get(show::<HeroSettings>).put(replace::<HeroSettings>))
        .route(
            "/contact",
            get(show::<ContactSettings>).put(replace::<ContactSettings>),
        )
        .route("/about", get(show::<About>).put(replace::<About>))
}

#[instrument(skip_all, fields(collection = T::COLLECTION))]
async fn show<T: Setting>(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<T>> {
    Ok(Json(get_singleton(state.store()).await?))
}

#[instrument(skip_all, fields(collection = T::COLLECTION))]
async fn replace<T: Setting>(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    Json(value): Json<T>,
) -> Result<Json<T>> {
    value.check()?;
    save_singleton(state.store(), &value).await?;
    info!("Settings saved");
    Ok(Json(value))
}
