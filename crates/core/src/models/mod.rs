//! Document shapes for every collection.
//!
//! Field names serialize camelCase. The `id` field is never written into the
//! stored body; [`crate::store::RawDocument::decode`] injects it on read.
//!
//! | Type | Collection | Kind |
//! |------|------------|------|
//! | [`Product`] | `products` | document |
//! | [`Category`] | `categories` | document |
//! | [`Faq`] | `faqs` | document |
//! | [`ContactMessage`] | `contact_messages` | document |
//! | [`ColorOption`] | `colors` | document |
//! | [`SizeOption`] | `sizes` | document |
//! | [`HeroSettings`] | `hero_settings/global` | singleton |
//! | [`ContactSettings`] | `contact_settings/global` | singleton |
//! | [`About`] | `about/global` | singleton |

use chrono::{DateTime, SubsecRound, Utc};

pub mod about;
pub mod category;
pub mod contact;
pub mod faq;
pub mod hero;
pub mod options;
pub mod product;

pub use about::About;
pub use category::Category;
pub use contact::{
    BusinessHours, ContactMessage, ContactSettings, MessageUpdate, NewContactMessage, SocialLinks,
};
pub use faq::Faq;
pub use hero::{CarouselHero, GridHero, HeroImage, HeroSettings, HeroSlide, HeroView};
pub use options::{ColorOption, SizeOption};
pub use product::{Product, ProductImage};

/// Timestamps are stored with whole-second precision so their RFC 3339
/// strings sort lexicographically in time order.
#[must_use]
pub fn timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(0)
}

const fn default_true() -> bool {
    true
}
