//! FAQ entries.

use serde::{Deserialize, Serialize};

use crate::store::Document;
use crate::types::FaqId;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    #[serde(default)]
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    /// Free-form grouping label, e.g. `Shipping`.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub published: bool,
}

impl Document for Faq {
    const COLLECTION: &'static str = "faqs";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = FaqId::new(id);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("question", &self.question);
        errors.require("answer", &self.answer);
        errors.into_result()
    }
}

/// Group published FAQs by category, keeping first-seen category order and
/// `order` within each group.
#[must_use]
pub fn group_by_category(faqs: &[Faq]) -> Vec<(String, Vec<&Faq>)> {
    let mut groups: Vec<(String, Vec<&Faq>)> = Vec::new();
    for faq in faqs.iter().filter(|f| f.published) {
        let label = if faq.category.trim().is_empty() {
            "General".to_string()
        } else {
            faq.category.trim().to_string()
        };
        match groups.iter_mut().find(|(name, _)| *name == label) {
            Some((_, items)) => items.push(faq),
            None => groups.push((label, vec![faq])),
        }
    }
    for (_, items) in &mut groups {
        items.sort_by_key(|f| f.order);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(question: &str, category: &str, order: i64, published: bool) -> Faq {
        Faq {
            question: question.to_string(),
            answer: "Yes".to_string(),
            category: category.to_string(),
            order,
            published,
            ..Faq::default()
        }
    }

    #[test]
    fn test_group_by_category() {
        let faqs = vec![
            faq("Returns?", "Orders", 2, true),
            faq("Islandwide?", "Shipping", 1, true),
            faq("Cancel?", "Orders", 1, true),
            faq("Hidden?", "Orders", 0, false),
            faq("Hello?", "", 0, true),
        ];
        let groups = group_by_category(&faqs);
        let names: Vec<&str> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Orders", "Shipping", "General"]);
        let orders: Vec<&str> = groups[0].1.iter().map(|f| f.question.as_str()).collect();
        assert_eq!(orders, vec!["Cancel?", "Returns?"]);
    }
}
