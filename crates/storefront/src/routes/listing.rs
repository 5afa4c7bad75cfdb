//! Listing query parameters.
//!
//! Query strings are replayed through the [`FilterState`] reducer, so a
//! listing URL and an interactive filter change produce the same state.
//! Colors and sizes are comma-separated: `?colors=Red,Blue&sizes=M`.

use elegant_closet_core::catalog::{
    CategoryTree, FilterAction, FilterState, PriceRange, SortOrder,
};
use elegant_closet_core::models::Category;
use elegant_closet_core::store::Cursor;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Raw listing parameters from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    /// Sub-category slug.
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub sizes: Option<String>,
    /// `on`, `true` or `1` for sale items only.
    #[serde(default)]
    pub sale: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Cursor token from the previous page.
    #[serde(default)]
    pub after: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_amount(field: &str, raw: Option<&String>) -> Result<Option<Decimal>> {
    non_blank(raw)
        .map(|v| {
            v.parse::<Decimal>()
                .ok()
                .filter(|d| !d.is_sign_negative())
                .ok_or_else(|| AppError::BadRequest(format!("invalid {field} price: {v}")))
        })
        .transpose()
}

/// Distinct non-blank entries of a comma-separated list.
fn split_list(raw: Option<&String>) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in non_blank(raw).into_iter().flat_map(|v| v.split(',')) {
        let value = value.trim();
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}

impl ListingParams {
    /// Actions that turn a default state into the requested one.
    ///
    /// `scope` is the category the route is scoped to; a child category
    /// selects its parent and itself as the sub-category.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for an unknown sub-category or one outside
    /// `scope`, a malformed price or an unknown sort order.
    pub fn actions(
        &self,
        tree: &CategoryTree,
        scope: Option<&Category>,
    ) -> Result<Vec<FilterAction>> {
        let mut actions = Vec::new();

        if let Some(category) = scope {
            match &category.parent_id {
                Some(parent) => {
                    actions.push(FilterAction::SetCategory(Some(parent.clone())));
                    actions.push(FilterAction::SetSubCategory(Some(category.id.clone())));
                }
                None => actions.push(FilterAction::SetCategory(Some(category.id.clone()))),
            }
        }

        if let Some(slug) = non_blank(self.sub.as_ref()) {
            let sub = tree
                .find_by_slug(slug)
                .filter(|c| !c.is_top_level())
                .ok_or_else(|| AppError::BadRequest(format!("unknown sub-category: {slug}")))?;
            if let Some(category) = scope {
                let top = category.parent_id.as_ref().unwrap_or(&category.id);
                if sub.parent_id.as_ref() != Some(top) {
                    return Err(AppError::BadRequest(format!(
                        "sub-category {slug} is not under {}",
                        category.slug
                    )));
                }
            }
            actions.push(FilterAction::SetSubCategory(Some(sub.id.clone())));
        }

        let min = parse_amount("min", self.min.as_ref())?;
        let max = parse_amount("max", self.max.as_ref())?;
        if min.is_some() || max.is_some() {
            let min = min.unwrap_or(Decimal::ZERO);
            let max = max.unwrap_or(Decimal::MAX);
            if min > max {
                return Err(AppError::BadRequest(
                    "min price is above max price".to_string(),
                ));
            }
            actions.push(FilterAction::SetPriceRange(Some(PriceRange::new(min, max))));
        }

        actions.extend(
            split_list(self.colors.as_ref())
                .into_iter()
                .map(FilterAction::ToggleColor),
        );
        actions.extend(
            split_list(self.sizes.as_ref())
                .into_iter()
                .map(FilterAction::ToggleSize),
        );

        if non_blank(self.sale.as_ref()).is_some_and(|v| matches!(v, "on" | "true" | "1")) {
            actions.push(FilterAction::SetSaleOnly(true));
        }
        if let Some(term) = non_blank(self.q.as_ref()) {
            actions.push(FilterAction::SetSearch(Some(term.to_string())));
        }
        if let Some(sort) = non_blank(self.sort.as_ref()) {
            let order: SortOrder = sort.parse().map_err(AppError::BadRequest)?;
            actions.push(FilterAction::SetSort(order));
        }

        Ok(actions)
    }

    /// The filter state these parameters describe.
    ///
    /// # Errors
    ///
    /// See [`ListingParams::actions`].
    pub fn filter_state(
        &self,
        tree: &CategoryTree,
        scope: Option<&Category>,
    ) -> Result<FilterState> {
        let mut state = FilterState::default();
        for action in self.actions(tree, scope)? {
            state.apply(action);
        }
        Ok(state)
    }

    /// The decoded `after` cursor.
    ///
    /// # Errors
    ///
    /// Returns an invalid-cursor error for a malformed token.
    pub fn cursor(&self) -> Result<Option<Cursor>> {
        non_blank(self.after.as_ref())
            .map(Cursor::decode)
            .transpose()
            .map_err(AppError::from)
    }

    /// Query string for the same listing continuing after `token`.
    #[must_use]
    pub fn next_page_query(&self, token: &str) -> String {
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        let fields = [
            ("sub", &self.sub),
            ("min", &self.min),
            ("max", &self.max),
            ("colors", &self.colors),
            ("sizes", &self.sizes),
            ("sale", &self.sale),
            ("q", &self.q),
            ("sort", &self.sort),
            ("currency", &self.currency),
        ];
        for (key, value) in fields {
            if let Some(value) = non_blank(value.as_ref()) {
                pairs.push((key, value));
            }
        }
        pairs.push(("after", token));
        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_closet_core::types::CategoryId;

    use super::*;

    fn tree() -> CategoryTree {
        CategoryTree::new(vec![
            Category {
                id: CategoryId::new("tops"),
                name: "Tops".to_string(),
                slug: "tops".to_string(),
                ..Category::default()
            },
            Category {
                id: CategoryId::new("blouses"),
                name: "Blouses".to_string(),
                slug: "blouses".to_string(),
                parent_id: Some(CategoryId::new("tops")),
                ..Category::default()
            },
            Category {
                id: CategoryId::new("dresses"),
                name: "Dresses".to_string(),
                slug: "dresses".to_string(),
                ..Category::default()
            },
            Category {
                id: CategoryId::new("maxi"),
                name: "Maxi".to_string(),
                slug: "maxi".to_string(),
                parent_id: Some(CategoryId::new("dresses")),
                ..Category::default()
            },
        ])
    }

    #[test]
    fn test_params_build_state() {
        let params = ListingParams {
            min: Some("1000".to_string()),
            colors: Some("Red, Blue,Red,".to_string()),
            sale: Some("on".to_string()),
            q: Some("  linen ".to_string()),
            sort: Some("price-desc".to_string()),
            ..ListingParams::default()
        };
        let state = params.filter_state(&tree(), None).unwrap();
        assert_eq!(state.criteria.colors, vec!["Red", "Blue"]);
        assert!(state.criteria.sale_only);
        assert_eq!(state.criteria.search.as_deref(), Some("linen"));
        assert_eq!(state.sort, SortOrder::PriceDesc);
        let range = state.criteria.price.unwrap();
        assert_eq!(range.min, Decimal::from(1000));
        assert_eq!(range.max, Decimal::MAX);
    }

    #[test]
    fn test_child_scope_sets_parent_and_sub() {
        let tree = tree();
        let maxi = tree.find_by_slug("maxi").unwrap();
        let state = ListingParams::default()
            .filter_state(&tree, Some(maxi))
            .unwrap();
        assert_eq!(state.category, Some(CategoryId::new("dresses")));
        assert_eq!(state.criteria.sub_category, Some(CategoryId::new("maxi")));
    }

    #[test]
    fn test_sub_category_must_sit_under_scope() {
        let tree = tree();
        let dresses = tree.find_by_slug("dresses").unwrap();
        let maxi = tree.find_by_slug("maxi").unwrap();
        let blouses = ListingParams {
            sub: Some("blouses".to_string()),
            ..ListingParams::default()
        };
        assert!(matches!(
            blouses.filter_state(&tree, Some(dresses)),
            Err(AppError::BadRequest(_))
        ));
        assert!(blouses.filter_state(&tree, Some(maxi)).is_err());
        assert!(blouses.filter_state(&tree, None).is_ok());

        let own = ListingParams {
            sub: Some("maxi".to_string()),
            ..ListingParams::default()
        };
        let state = own.filter_state(&tree, Some(dresses)).unwrap();
        assert_eq!(state.criteria.sub_category, Some(CategoryId::new("maxi")));
        assert!(own.filter_state(&tree, Some(maxi)).is_ok());
    }

    #[test]
    fn test_rejects_bad_input() {
        let tree = tree();
        let bad_sort = ListingParams {
            sort: Some("cheapest".to_string()),
            ..ListingParams::default()
        };
        assert!(bad_sort.filter_state(&tree, None).is_err());

        let inverted = ListingParams {
            min: Some("500".to_string()),
            max: Some("100".to_string()),
            ..ListingParams::default()
        };
        assert!(inverted.filter_state(&tree, None).is_err());

        let top_as_sub = ListingParams {
            sub: Some("dresses".to_string()),
            ..ListingParams::default()
        };
        assert!(top_as_sub.filter_state(&tree, None).is_err());

        let bad_cursor = ListingParams {
            after: Some("%%%".to_string()),
            ..ListingParams::default()
        };
        assert!(bad_cursor.cursor().is_err());
    }

    #[test]
    fn test_next_page_query_keeps_filters() {
        let params = ListingParams {
            colors: Some("Red,Blue".to_string()),
            sort: Some("price-asc".to_string()),
            after: Some("old".to_string()),
            ..ListingParams::default()
        };
        assert_eq!(
            params.next_page_query("abc"),
            "colors=Red%2CBlue&sort=price-asc&after=abc"
        );
    }
}
