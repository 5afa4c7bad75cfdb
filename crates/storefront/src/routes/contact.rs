//! Contact page and form handlers.
//!
//! Submissions are stored as unread messages for the admin inbox.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
};
use elegant_closet_core::models::{ContactSettings, NewContactMessage};
use tracing::{instrument, warn};

use super::{CurrencyQuery, chrome, parse_currency};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;
use crate::views::Chrome;

#[derive(Clone)]
pub struct HoursRow {
    pub day: String,
    pub label: String,
}

#[derive(Clone)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub chrome: Chrome,
    pub address: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub hours: Vec<HoursRow>,
    pub social: Vec<SocialLink>,
    pub map_embed_url: String,
    /// Values echoed back into the form after a failed submission.
    pub form: NewContactMessage,
    pub phone_value: String,
    pub errors: Vec<String>,
    pub sent: bool,
}

impl ContactTemplate {
    fn new(chrome: Chrome, settings: &ContactSettings) -> Self {
        Self {
            chrome,
            address: settings.address.clone(),
            phones: settings.phones.clone(),
            emails: settings.emails.clone(),
            hours: settings
                .business_hours
                .iter()
                .map(|h| HoursRow {
                    day: h.day.clone(),
                    label: h.label(),
                })
                .collect(),
            social: settings
                .social
                .links()
                .into_iter()
                .map(|(name, url)| SocialLink {
                    name: name.to_string(),
                    url: url.to_string(),
                })
                .collect(),
            map_embed_url: settings.map_embed_url.clone().unwrap_or_default(),
            form: NewContactMessage::default(),
            phone_value: String::new(),
            errors: Vec::new(),
            sent: false,
        }
    }
}

async fn page(state: &AppState, currency: Option<&str>) -> Result<ContactTemplate> {
    let currency = parse_currency(currency)?;
    let rates = state.catalog().rates().await?;
    let chrome = chrome(state, currency, &rates).await?;
    let settings = state.catalog().contact().await?;
    Ok(ContactTemplate::new(chrome, &settings))
}

/// Display the contact page.
///
/// # Errors
///
/// Returns a store error.
#[instrument(skip(state, query))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<ContactTemplate> {
    page(&state, query.currency.as_deref()).await
}

/// Submit the contact form.
///
/// Invalid submissions re-render the form with the entered values and a
/// 400 status.
///
/// # Errors
///
/// Returns a store error if the message cannot be saved.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<NewContactMessage>,
) -> Result<(StatusCode, ContactTemplate)> {
    let mut template = page(&state, None).await?;

    match state.catalog().submit_contact(form.clone()).await {
        Ok(id) => {
            add_breadcrumb("contact", "Message submitted", &[("message_id", id.as_str())]);
            template.sent = true;
            Ok((StatusCode::OK, template))
        }
        Err(AppError::Validation(errors)) => {
            warn!(fields = errors.errors().len(), "Contact form rejected");
            template.errors = errors
                .errors()
                .iter()
                .map(|e| format!("{} {}", e.field, e.message))
                .collect();
            template.phone_value = form.phone.clone().unwrap_or_default();
            template.form = form;
            Ok((StatusCode::BAD_REQUEST, template))
        }
        Err(err) => Err(err),
    }
}
