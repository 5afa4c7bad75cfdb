//! Home page hero settings (singleton `hero_settings/global`).
//!
//! Two layouts are edited independently; `activeVersion` picks the one the
//! storefront renders.

use serde::{Deserialize, Serialize};

use crate::store::Singleton;
use crate::types::HeroVersion;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    pub image_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselHero {
    #[serde(default)]
    pub slides: Vec<HeroSlide>,
    /// Seconds between slides.
    #[serde(default = "default_interval")]
    pub interval_seconds: u32,
}

impl Default for CarouselHero {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            interval_seconds: default_interval(),
        }
    }
}

const fn default_interval() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GridHero {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
    #[serde(default)]
    pub images: Vec<HeroImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeroSettings {
    #[serde(default)]
    pub active_version: HeroVersion,
    #[serde(default)]
    pub carousel: CarouselHero,
    #[serde(default)]
    pub grid: GridHero,
}

/// The hero layout to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroView<'a> {
    Carousel(&'a CarouselHero),
    Grid(&'a GridHero),
}

impl HeroSettings {
    /// The layout to render: the active one when it has images, otherwise
    /// the other one when it has images, otherwise nothing.
    #[must_use]
    pub fn selected(&self) -> Option<HeroView<'_>> {
        let carousel = (!self.carousel.slides.is_empty()).then_some(HeroView::Carousel(&self.carousel));
        let grid = (!self.grid.images.is_empty()).then_some(HeroView::Grid(&self.grid));
        match self.active_version {
            HeroVersion::Carousel => carousel.or(grid),
            HeroVersion::Grid => grid.or(carousel),
        }
    }

    /// Carousel slides sorted by display order.
    #[must_use]
    pub fn ordered_slides(&self) -> Vec<&HeroSlide> {
        let mut slides: Vec<&HeroSlide> = self.carousel.slides.iter().collect();
        slides.sort_by_key(|s| s.order);
        slides
    }

    /// # Errors
    ///
    /// Returns every image or link that is not an absolute URL.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for slide in &self.carousel.slides {
            errors.require_url("carousel.slides.imageUrl", &slide.image_url);
        }
        for image in &self.grid.images {
            errors.require_url("grid.images.url", &image.url);
        }
        if self.carousel.interval_seconds == 0 {
            errors.push("carousel.intervalSeconds", "must be at least one second");
        }
        errors.into_result()
    }
}

impl Singleton for HeroSettings {
    const COLLECTION: &'static str = "hero_settings";
}
