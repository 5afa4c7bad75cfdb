//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use elegant_closet_core::models::{HeroSettings, HeroView};
use tracing::instrument;

use super::{CurrencyQuery, chrome, parse_currency};
use crate::error::Result;
use crate::filters;
use crate::state::AppState;
use crate::views::{Chrome, MenuLink, ProductCard};

/// A carousel slide or grid tile.
#[derive(Clone)]
pub struct HeroItem {
    pub image_url: String,
    pub alt: String,
    pub title: String,
    pub subtitle: String,
    pub cta_label: String,
    pub cta_link: String,
}

/// The hero section as the template renders it.
#[derive(Clone, Default)]
pub struct HeroBlock {
    /// `carousel`, `grid`, or empty when there is nothing to show.
    pub layout: String,
    pub items: Vec<HeroItem>,
    pub interval_ms: u32,
    pub title: String,
    pub subtitle: String,
    pub cta_label: String,
    pub cta_link: String,
}

impl HeroBlock {
    fn from_settings(settings: &HeroSettings) -> Self {
        match settings.selected() {
            None => Self::default(),
            Some(HeroView::Carousel(carousel)) => Self {
                layout: "carousel".to_string(),
                items: settings
                    .ordered_slides()
                    .into_iter()
                    .map(|slide| HeroItem {
                        image_url: slide.image_url.clone(),
                        alt: slide.title.clone(),
                        title: slide.title.clone(),
                        subtitle: slide.subtitle.clone(),
                        cta_label: slide.cta_label.clone().unwrap_or_default(),
                        cta_link: slide.cta_link.clone().unwrap_or_default(),
                    })
                    .collect(),
                interval_ms: carousel.interval_seconds.saturating_mul(1000),
                ..Self::default()
            },
            Some(HeroView::Grid(grid)) => Self {
                layout: "grid".to_string(),
                items: grid
                    .images
                    .iter()
                    .map(|image| HeroItem {
                        image_url: image.url.clone(),
                        alt: image.alt.clone(),
                        title: String::new(),
                        subtitle: String::new(),
                        cta_label: String::new(),
                        cta_link: image.link.clone().unwrap_or_default(),
                    })
                    .collect(),
                interval_ms: 0,
                title: grid.title.clone(),
                subtitle: grid.subtitle.clone(),
                cta_label: grid.cta_label.clone().unwrap_or_default(),
                cta_link: grid.cta_link.clone().unwrap_or_default(),
            },
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub hero: HeroBlock,
    pub categories: Vec<MenuLink>,
    pub featured: Vec<ProductCard>,
    pub new_arrivals: Vec<ProductCard>,
}

/// Display the home page.
///
/// # Errors
///
/// Returns 400 for an unsupported currency.
#[instrument(skip(state, query))]
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<HomeTemplate> {
    let currency = parse_currency(query.currency.as_deref())?;
    let catalog = state.catalog();
    let rates = catalog.rates().await?;
    let chrome = chrome(&state, currency, &rates).await?;
    let hero = catalog.hero().await?;

    let (featured, new_arrivals) = tokio::try_join!(catalog.featured(), catalog.new_arrivals())?;

    Ok(HomeTemplate {
        categories: chrome.menu.clone(),
        chrome,
        hero: HeroBlock::from_settings(&hero),
        featured: ProductCard::all(&featured, currency, &rates.table),
        new_arrivals: ProductCard::all(&new_arrivals, currency, &rates.table),
    })
}
