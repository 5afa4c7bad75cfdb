//! About page content (singleton `about/global`).

use serde::{Deserialize, Serialize};

use crate::store::Singleton;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct About {
    #[serde(default)]
    pub title: String,
    /// Story paragraphs, rendered in order.
    #[serde(default)]
    pub story: Vec<String>,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl About {
    /// # Errors
    ///
    /// Returns a missing title or malformed image URL.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title);
        errors.optional_url("image", self.image.as_deref());
        errors.into_result()
    }
}

impl Singleton for About {
    const COLLECTION: &'static str = "about";
}
