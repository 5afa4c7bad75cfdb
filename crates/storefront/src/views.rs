//! Display models shared by page templates and the JSON API.
//!
//! Templates only see plain strings and flags; currency projection, badges
//! and image fallbacks are resolved here.

use elegant_closet_core::catalog::currency::{self, RateTable};
use elegant_closet_core::catalog::{CategoryTree, SortOrder, discount};
use elegant_closet_core::models::Product;
use elegant_closet_core::types::CurrencyCode;
use rust_decimal::Decimal;
use serde::Serialize;

/// Image shown when a product has none.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

/// Format a base-currency amount in `currency`, falling back to the base
/// currency when the table has no rate for it.
#[must_use]
pub fn display_amount(amount: Decimal, currency: CurrencyCode, rates: &RateTable) -> String {
    currency::project(amount, currency, rates)
        .unwrap_or_else(|_| currency::format(amount, CurrencyCode::BASE))
}

/// Prices of one product in the selected currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceView {
    /// What the customer pays.
    pub current: String,
    /// Crossed-out base price when on sale, otherwise empty.
    pub original: String,
    /// Discount badge such as `-25%`, otherwise empty.
    pub badge: String,
}

impl PriceView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode, rates: &RateTable) -> Self {
        if product.is_on_sale() {
            Self {
                current: display_amount(product.effective_price(), currency, rates),
                original: display_amount(product.price, currency, rates),
                badge: discount::badge(product).unwrap_or_default(),
            }
        } else {
            Self {
                current: display_amount(product.price, currency, rates),
                original: String::new(),
                badge: String::new(),
            }
        }
    }
}

/// A product tile in listings and home page strips.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub slug: String,
    pub name: String,
    pub image_url: String,
    pub image_alt: String,
    pub price: PriceView,
    pub in_stock: bool,
    pub is_new: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode, rates: &RateTable) -> Self {
        let (image_url, image_alt) = product.primary_image().map_or_else(
            || (PLACEHOLDER_IMAGE.to_string(), product.name.clone()),
            |img| {
                let alt = if img.alt.is_empty() {
                    product.name.clone()
                } else {
                    img.alt.clone()
                };
                (img.url.clone(), alt)
            },
        );
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            image_url,
            image_alt,
            price: PriceView::new(product, currency, rates),
            in_stock: product.in_stock,
            is_new: product.is_new,
        }
    }

    /// Cards for a list of products.
    #[must_use]
    pub fn all(products: &[Product], currency: CurrencyCode, rates: &RateTable) -> Vec<Self> {
        products
            .iter()
            .map(|p| Self::new(p, currency, rates))
            .collect()
    }
}

/// A navigation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLink {
    pub name: String,
    pub href: String,
    pub children: Vec<MenuLink>,
}

/// Navigation menu from the category tree.
#[must_use]
pub fn menu_links(tree: &CategoryTree) -> Vec<MenuLink> {
    tree.menu()
        .into_iter()
        .map(|entry| MenuLink {
            name: entry.category.name.clone(),
            href: format!("/categories/{}", entry.category.slug),
            children: entry
                .children
                .iter()
                .map(|child| MenuLink {
                    name: child.name.clone(),
                    href: format!("/categories/{}", child.slug),
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect()
}

/// An entry of a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Currency selector entries for the currencies the table can convert to.
#[must_use]
pub fn currency_options(rates: &RateTable, selected: CurrencyCode) -> Vec<SelectOption> {
    rates
        .available()
        .into_iter()
        .map(|c| SelectOption {
            value: c.code().to_string(),
            label: format!("{} {}", c.flag(), c.code()),
            selected: c == selected,
        })
        .collect()
}

/// Sort selector entries.
#[must_use]
pub fn sort_options(selected: SortOrder) -> Vec<SelectOption> {
    SortOrder::ALL
        .into_iter()
        .map(|o| SelectOption {
            value: o.as_str().to_string(),
            label: o.label().to_string(),
            selected: o == selected,
        })
        .collect()
}

/// A facet checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub checked: bool,
}

/// Checkboxes for facet values, marking the selected ones.
#[must_use]
pub fn facet_options(values: &[String], selected: &[String]) -> Vec<FacetOption> {
    values
        .iter()
        .map(|v| FacetOption {
            value: v.clone(),
            checked: selected.contains(v),
        })
        .collect()
}

/// Layout data every page needs.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub menu: Vec<MenuLink>,
    pub currencies: Vec<SelectOption>,
    pub currency: String,
    /// Set when the rate table is past its TTL.
    pub rates_stale: bool,
    pub whatsapp_link: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_closet_core::models::{Category, ProductImage};
    use elegant_closet_core::types::CategoryId;

    use super::*;

    fn dress() -> Product {
        Product {
            name: "Linen Wrap Dress".to_string(),
            slug: "linen-wrap-dress".to_string(),
            price: Decimal::from(1000),
            sale_price: Some(Decimal::from(750)),
            ..Product::default()
        }
    }

    #[test]
    fn test_price_view_on_sale() {
        let view = PriceView::new(&dress(), CurrencyCode::LKR, &RateTable::defaults());
        assert_eq!(view.current, "Rs 750.00");
        assert_eq!(view.original, "Rs 1,000.00");
        assert_eq!(view.badge, "-25%");
    }

    #[test]
    fn test_price_view_converts() {
        let mut product = dress();
        product.sale_price = None;
        let view = PriceView::new(&product, CurrencyCode::USD, &RateTable::defaults());
        assert!(view.current.starts_with('$'));
        assert!(view.original.is_empty());
        assert!(view.badge.is_empty());
    }

    #[test]
    fn test_missing_rate_falls_back_to_base() {
        let rates = RateTable::from_rates([], chrono::Utc::now(), "test");
        assert_eq!(
            display_amount(Decimal::from(4500), CurrencyCode::EUR, &rates),
            "Rs 4,500.00"
        );
    }

    #[test]
    fn test_card_uses_first_image_or_placeholder() {
        let mut product = dress();
        let card = ProductCard::new(&product, CurrencyCode::LKR, &RateTable::defaults());
        assert_eq!(card.image_url, PLACEHOLDER_IMAGE);

        product.images = vec![
            ProductImage {
                url: "https://i.ibb.co/b.jpg".to_string(),
                alt: String::new(),
                order: 2,
            },
            ProductImage {
                url: "https://i.ibb.co/a.jpg".to_string(),
                alt: "Front".to_string(),
                order: 1,
            },
        ];
        let card = ProductCard::new(&product, CurrencyCode::LKR, &RateTable::defaults());
        assert_eq!(card.image_url, "https://i.ibb.co/a.jpg");
        assert_eq!(card.image_alt, "Front");
    }

    #[test]
    fn test_menu_links() {
        let tree = CategoryTree::new(vec![
            Category {
                id: CategoryId::new("dresses"),
                name: "Dresses".to_string(),
                slug: "dresses".to_string(),
                show_in_menu: true,
                ..Category::default()
            },
            Category {
                id: CategoryId::new("maxi"),
                name: "Maxi".to_string(),
                slug: "maxi".to_string(),
                parent_id: Some(CategoryId::new("dresses")),
                show_in_menu: true,
                ..Category::default()
            },
        ]);
        let links = menu_links(&tree);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/categories/dresses");
        assert_eq!(links[0].children[0].href, "/categories/maxi");
    }

    #[test]
    fn test_facet_options_mark_selected() {
        let values = vec!["Red".to_string(), "Blue".to_string()];
        let options = facet_options(&values, &["Blue".to_string()]);
        assert!(!options[0].checked);
        assert!(options[1].checked);
    }
}
