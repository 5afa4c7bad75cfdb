//! Product documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Document;
use crate::types::{CategoryId, Price, ProductId, ProductStatus};
use crate::validation::{ValidationErrors, is_valid_url};

/// One product photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    /// Display position, lowest first.
    #[serde(default)]
    pub order: u32,
}

/// A catalog product. All amounts are in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<Decimal>,
    /// Stored badge percentage. May drift from the price pair; see
    /// [`crate::catalog::discount`].
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default = "super::default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product has a strictly positive sale price.
    ///
    /// A sale price of zero is treated as "no sale".
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some_and(|sale| sale > Decimal::ZERO)
    }

    /// The price a customer pays: the sale price when on sale.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match self.sale_price {
            Some(sale) if sale > Decimal::ZERO => sale,
            _ => self.price,
        }
    }

    /// Base price in the base currency.
    #[must_use]
    pub const fn base_price(&self) -> Price {
        Price::base(self.price)
    }

    /// Whether the storefront shows this product.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }

    /// Images sorted by display order.
    #[must_use]
    pub fn ordered_images(&self) -> Vec<&ProductImage> {
        let mut images: Vec<&ProductImage> = self.images.iter().collect();
        images.sort_by_key(|img| img.order);
        images
    }

    /// First image by display order.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().min_by_key(|img| img.order)
    }

    /// Whether `category` is this product's category or sub-category.
    #[must_use]
    pub fn in_category(&self, category: &CategoryId) -> bool {
        &self.category_id == category || self.sub_category_id.as_ref() == Some(category)
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = ProductId::new(id);
    }

    fn stamp(&mut self, now: DateTime<Utc>, existing: Option<&Self>) {
        let now = super::timestamp(now);
        match existing {
            Some(stored) => {
                self.created_at = stored.created_at;
                self.view_count = stored.view_count;
            }
            None => self.created_at = now,
        }
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require_slug("slug", &self.slug);
        if self.price <= Decimal::ZERO {
            errors.push("price", "must be greater than zero");
        }
        if let Some(sale) = self.sale_price {
            if sale < Decimal::ZERO {
                errors.push("salePrice", "cannot be negative");
            } else if sale >= self.price {
                errors.push("salePrice", "must be lower than price");
            }
        }
        if let Some(pct) = self.discount_percentage
            && (pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED)
        {
            errors.push("discountPercentage", "must be between 0 and 100");
        }
        if self.category_id.is_empty() {
            errors.push("categoryId", "is required");
        }
        if self.images.iter().any(|img| !is_valid_url(&img.url)) {
            errors.push("images", "every image needs an absolute http(s) URL");
        }
        if self.colors.iter().chain(&self.sizes).any(|v| v.trim().is_empty()) {
            errors.push("colors", "blank color or size values are not allowed");
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
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn dress() -> Product {
        Product {
            name: "Linen Wrap Dress".to_string(),
            slug: "linen-wrap-dress".to_string(),
            price: Decimal::from(4500),
            category_id: CategoryId::new("dresses"),
            images: vec![
                ProductImage {
                    url: "https://i.ibb.co/b.jpg".to_string(),
                    alt: "Back".to_string(),
                    order: 2,
                },
                ProductImage {
                    url: "https://i.ibb.co/f.jpg".to_string(),
                    alt: "Front".to_string(),
                    order: 1,
                },
            ],
            ..Product::default()
        }
    }

    #[test]
    fn test_deserialize_stored_document() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Silk Top",
            "slug": "silk-top",
            "price": 2500,
            "salePrice": 1999.5,
            "colors": ["Red"],
            "categoryId": "tops",
            "status": "published",
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.sale_price, Some(Decimal::new(19995, 1)));
        assert!(product.in_stock);
        assert!(product.is_published());
        assert!(product.is_on_sale());
        assert_eq!(product.effective_price(), Decimal::new(19995, 1));
    }

    #[test]
    fn test_zero_sale_price_is_not_a_sale() {
        let mut product = dress();
        product.sale_price = Some(Decimal::ZERO);
        assert!(!product.is_on_sale());
        assert_eq!(product.effective_price(), Decimal::from(4500));
    }

    #[test]
    fn test_primary_image_uses_order() {
        let product = dress();
        assert_eq!(product.primary_image().unwrap().alt, "Front");
        let alts: Vec<&str> = product.ordered_images().iter().map(|i| i.alt.as_str()).collect();
        assert_eq!(alts, vec!["Front", "Back"]);
    }

    #[test]
    fn test_validate_sale_price_below_price() {
        let mut product = dress();
        assert!(product.validate().is_ok());

        product.sale_price = Some(Decimal::from(4500));
        let errors = product.validate().unwrap_err();
        assert!(errors.has("salePrice"));

        product.sale_price = Some(Decimal::from(3000));
        product.slug = "Not A Slug".to_string();
        let errors = product.validate().unwrap_err();
        assert!(errors.has("slug"));
        assert!(!errors.has("salePrice"));
    }

    #[test]
    fn test_stamp_keeps_creation_time_and_views() {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let stored = Product {
            created_at: created,
            view_count: 41,
            ..dress()
        };
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        let mut edit = dress();
        edit.stamp(now, Some(&stored));
        assert_eq!(edit.created_at, created);
        assert_eq!(edit.updated_at, now);
        assert_eq!(edit.view_count, 41);
    }
}
