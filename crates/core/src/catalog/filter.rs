//! Client-side filtering, sorting and the listing filter state.
//!
//! The remote query only expresses status, category and sort. Everything
//! else (price range, colors, sizes, sale-only, search) is applied to the
//! loaded records by [`filter_products`]. All predicates are ANDed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::store::{Document, Query, SortKey};
use crate::types::{CategoryId, ProductStatus};

/// Inclusive price interval on the base `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }

    /// Smallest range covering every product's base price.
    #[must_use]
    pub fn spanning<'a>(products: impl IntoIterator<Item = &'a Product>) -> Option<Self> {
        products.into_iter().fold(None, |range, p| {
            Some(match range {
                None => Self::new(p.price, p.price),
                Some(r) => Self::new(r.min.min(p.price), r.max.max(p.price)),
            })
        })
    }
}

/// Client-side predicates. Empty color/size lists mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub sub_category: Option<CategoryId>,
    #[serde(default)]
    pub price: Option<PriceRange>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub sale_only: bool,
    #[serde(default)]
    pub search: Option<String>,
}

impl FilterCriteria {
    /// Whether a product passes every predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(sub) = &self.sub_category
            && product.sub_category_id.as_ref() != Some(sub)
        {
            return false;
        }
        if let Some(range) = &self.price
            && !range.contains(product.price)
        {
            return false;
        }
        if !self.colors.is_empty() && !product.colors.iter().any(|c| self.colors.contains(c)) {
            return false;
        }
        if !self.sizes.is_empty() && !product.sizes.iter().any(|s| self.sizes.contains(s)) {
            return false;
        }
        if self.sale_only && !product.is_on_sale() {
            return false;
        }
        self.search
            .as_deref()
            .is_none_or(|term| matches_search(product, term))
    }

    /// Whether no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Products passing `criteria`, in input order.
#[must_use]
pub fn filter_products<'a>(all: &'a [Product], criteria: &FilterCriteria) -> Vec<&'a Product> {
    all.iter().filter(|p| criteria.matches(p)).collect()
}

/// Case-insensitive substring match on name, SKU and description.
/// A blank term matches everything.
#[must_use]
pub fn matches_search(product: &Product, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || [&product.name, &product.sku, &product.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
}

/// Listing sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    Popular,
}

impl SortOrder {
    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::Popular,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::Popular => "popular",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::NameAsc => "Name: A to Z",
            Self::Popular => "Most Popular",
        }
    }

    /// Sort key sent to the store.
    #[must_use]
    pub fn remote_sort_key(self) -> SortKey {
        match self {
            Self::Newest => SortKey::desc("createdAt"),
            Self::PriceAsc => SortKey::asc("price"),
            Self::PriceDesc => SortKey::desc("price"),
            Self::NameAsc => SortKey::asc("name"),
            Self::Popular => SortKey::desc("viewCount"),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("invalid sort order: {wanted}"))
    }
}

/// Sort loaded products in place. Ties keep id order.
pub fn sort_products(products: &mut [&Product], order: SortOrder) {
    products.sort_by(|a, b| {
        let primary = match order {
            SortOrder::Newest => b.created_at.cmp(&a.created_at),
            SortOrder::PriceAsc => a.price.cmp(&b.price),
            SortOrder::PriceDesc => b.price.cmp(&a.price),
            SortOrder::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortOrder::Popular => b.view_count.cmp(&a.view_count),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
}

/// Every filter input of a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub criteria: FilterCriteria,
    #[serde(default)]
    pub sort: SortOrder,
}

/// A single change to a [`FilterState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetCategory(Option<CategoryId>),
    SetSubCategory(Option<CategoryId>),
    SetPriceRange(Option<PriceRange>),
    ToggleColor(String),
    ToggleSize(String),
    SetSaleOnly(bool),
    SetSearch(Option<String>),
    SetSort(SortOrder),
    Reset,
}

/// What the caller must do after applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed.
    Unchanged,
    /// Only client-side predicates changed; re-filter the loaded records.
    Refilter,
    /// The remote query changed; drop the cursor and fetch from page one.
    Refetch,
}

fn toggle(values: &mut Vec<String>, value: String) {
    if let Some(pos) = values.iter().position(|v| *v == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}

impl FilterState {
    /// Apply one action and report the follow-up it requires.
    pub fn apply(&mut self, action: FilterAction) -> Effect {
        let before = self.clone();
        match action {
            FilterAction::SetCategory(category) => {
                if category != self.category {
                    self.criteria.sub_category = None;
                }
                self.category = category;
            }
            FilterAction::SetSubCategory(sub) => self.criteria.sub_category = sub,
            FilterAction::SetPriceRange(range) => self.criteria.price = range,
            FilterAction::ToggleColor(color) => toggle(&mut self.criteria.colors, color),
            FilterAction::ToggleSize(size) => toggle(&mut self.criteria.sizes, size),
            FilterAction::SetSaleOnly(on) => self.criteria.sale_only = on,
            FilterAction::SetSearch(term) => {
                self.criteria.search = term
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty());
            }
            FilterAction::SetSort(order) => self.sort = order,
            FilterAction::Reset => *self = Self::default(),
        }

        if *self == before {
            Effect::Unchanged
        } else if self.category != before.category
            || self.criteria.sub_category != before.criteria.sub_category
            || self.sort != before.sort
        {
            Effect::Refetch
        } else {
            Effect::Refilter
        }
    }

    /// The store query for this state: published products, optionally
    /// scoped to a category and sub-category, in the selected order.
    #[must_use]
    pub fn remote_query(&self, page_size: usize) -> Query {
        let mut query =
            Query::new(Product::COLLECTION).where_eq("status", ProductStatus::Published.as_str());
        if let Some(category) = &self.category {
            query = query.where_eq("categoryId", category.as_str());
        }
        if let Some(sub) = &self.criteria.sub_category {
            query = query.where_eq("subCategoryId", sub.as_str());
        }
        query.order_by(self.sort.remote_sort_key()).limit(page_size)
    }
}
