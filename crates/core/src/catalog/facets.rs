//! Color and size facets.
//!
//! Facets are the distinct values across the loaded (pre-filter) product
//! list, in first-seen order. Values are compared as raw strings, so `Red`
//! and `red` are two facets. [`canonical_facet_key`] exists only to report
//! such near-duplicates.

use serde::Serialize;

use crate::models::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Facets {
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

impl Facets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.sizes.is_empty()
    }
}

fn push_distinct(into: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !into.contains(value) {
            into.push(value.clone());
        }
    }
}

/// Distinct colors and sizes across `products`.
#[must_use]
pub fn extract_facets<'a>(products: impl IntoIterator<Item = &'a Product>) -> Facets {
    let mut facets = Facets::default();
    for product in products {
        push_distinct(&mut facets.colors, &product.colors);
        push_distinct(&mut facets.sizes, &product.sizes);
    }
    facets
}

/// Trimmed, lowercased, single-spaced form of a facet value.
#[must_use]
pub fn canonical_facet_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Groups of distinct raw values that share a canonical key.
#[must_use]
pub fn near_duplicate_facets(values: &[String]) -> Vec<Vec<String>> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for value in values {
        let key = canonical_facet_key(value);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => {
                if !members.contains(value) {
                    members.push(value.clone());
                }
            }
            None => groups.push((key, vec![value.clone()])),
        }
    }
    groups
        .into_iter()
        .filter_map(|(_, members)| (members.len() > 1).then_some(members))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_colors(colors: &[&str]) -> Product {
        Product {
            colors: colors.iter().map(ToString::to_string).collect(),
            ..Product::default()
        }
    }

    #[test]
    fn test_distinct_union_in_first_seen_order() {
        let products = [with_colors(&["Red"]), with_colors(&["Blue", "Red"])];
        let facets = extract_facets(&products);
        assert_eq!(facets.colors, vec!["Red", "Blue"]);
        assert!(facets.sizes.is_empty());
    }

    #[test]
    fn test_case_variants_are_separate_facets() {
        let products = [with_colors(&["Red", "red", " Red"])];
        assert_eq!(extract_facets(&products).colors.len(), 3);
    }

    #[test]
    fn test_near_duplicates() {
        let values: Vec<String> = ["Navy Blue", "navy  blue", "Red", "Green", "GREEN"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let groups = near_duplicate_facets(&values);
        assert_eq!(
            groups,
            vec![
                vec!["Navy Blue".to_string(), "navy  blue".to_string()],
                vec!["Green".to_string(), "GREEN".to_string()],
            ]
        );
    }
}
