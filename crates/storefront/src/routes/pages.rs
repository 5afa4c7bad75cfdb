//! Content page route handlers.
//!
//! FAQs and the about page are edited in the admin and read from the store.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use elegant_closet_core::models::faq::group_by_category;
use tracing::instrument;

use super::{CurrencyQuery, chrome, parse_currency};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;
use crate::views::Chrome;

#[derive(Clone)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Clone)]
pub struct FaqGroup {
    pub name: String,
    pub entries: Vec<FaqEntry>,
}

/// FAQ page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/faqs.html")]
pub struct FaqsTemplate {
    pub chrome: Chrome,
    pub groups: Vec<FaqGroup>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub chrome: Chrome,
    pub title: String,
    pub story: Vec<String>,
    pub mission: String,
    pub vision: String,
    pub image: String,
}

/// Display the FAQ page.
///
/// # Errors
///
/// Returns a store error.
#[instrument(skip(state, query))]
pub async fn faqs(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<FaqsTemplate> {
    let currency = parse_currency(query.currency.as_deref())?;
    let rates = state.catalog().rates().await?;
    let faqs = state.catalog().faqs().await?;

    let groups = group_by_category(&faqs)
        .into_iter()
        .map(|(name, entries)| FaqGroup {
            name,
            entries: entries
                .into_iter()
                .map(|faq| FaqEntry {
                    question: faq.question.clone(),
                    answer: faq.answer.clone(),
                })
                .collect(),
        })
        .collect();

    Ok(FaqsTemplate {
        chrome: chrome(&state, currency, &rates).await?,
        groups,
    })
}

/// Display the about page.
///
/// # Errors
///
/// Returns a store error.
#[instrument(skip(state, query))]
pub async fn about(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<AboutTemplate> {
    let currency = parse_currency(query.currency.as_deref())?;
    let rates = state.catalog().rates().await?;
    let about = state.catalog().about().await?;

    Ok(AboutTemplate {
        chrome: chrome(&state, currency, &rates).await?,
        title: if about.title.is_empty() {
            "About Us".to_string()
        } else {
            about.title.clone()
        },
        story: about.story.clone(),
        mission: about.mission.clone(),
        vision: about.vision.clone(),
        image: about.image.clone().unwrap_or_default(),
    })
}
