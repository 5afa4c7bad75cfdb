//! Category documents. Categories form a two-level tree via `parentId`.

use serde::{Deserialize, Serialize};

use crate::store::Document;
use crate::types::{CategoryId, CategoryStatus};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Parent category; `None` for top-level categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    /// Menu position, lowest first.
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub status: CategoryStatus,
    #[serde(default = "super::default_true")]
    pub show_in_menu: bool,
}

impl Category {
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CategoryStatus::Active
    }
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = CategoryId::new(id);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require_slug("slug", &self.slug);
        errors.optional_url("image", self.image.as_deref());
        if let Some(parent) = &self.parent_id
            && !self.id.is_empty()
            && parent == &self.id
        {
            errors.push("parentId", "a category cannot be its own parent");
        }
        errors.into_result()
    }

    fn unique_slug(&self) -> Option<&str> {
        Some(&self.slug)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_for_sparse_document() {
        let category: Category =
            serde_json::from_value(json!({ "name": "Dresses", "slug": "dresses" })).unwrap();
        assert!(category.is_top_level());
        assert!(category.is_active());
        assert!(category.show_in_menu);
        assert_eq!(category.order, 0);
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let category = Category {
            id: CategoryId::new("tops"),
            name: "Tops".to_string(),
            slug: "tops".to_string(),
            parent_id: Some(CategoryId::new("tops")),
            ..Category::default()
        };
        assert!(category.validate().unwrap_err().has("parentId"));
    }
}
