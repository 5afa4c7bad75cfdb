//! Sale badges.
//!
//! A product may store `discountPercentage` independently of its price pair,
//! so the two can drift. The stored value wins when present; otherwise the
//! percentage is derived as `round((price - salePrice) / price * 100)`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Product;

fn round_percent(value: Decimal) -> Option<u32> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

/// Percentage derived from a price pair, if the pair describes a discount.
#[must_use]
pub fn derived_percentage(price: Decimal, sale_price: Decimal) -> Option<u32> {
    if price <= Decimal::ZERO || sale_price <= Decimal::ZERO || sale_price >= price {
        return None;
    }
    round_percent((price - sale_price) / price * Decimal::ONE_HUNDRED)
}

/// The percentage shown on the product, or `None` when it is not on sale.
#[must_use]
pub fn discount_percentage(product: &Product) -> Option<u32> {
    if !product.is_on_sale() {
        return None;
    }
    product
        .discount_percentage
        .filter(|pct| *pct > Decimal::ZERO)
        .and_then(round_percent)
        .or_else(|| derived_percentage(product.price, product.sale_price?))
}

/// Badge text such as `-25%`.
#[must_use]
pub fn badge(product: &Product) -> Option<String> {
    discount_percentage(product).map(|pct| format!("-{pct}%"))
}

/// Whether the stored percentage disagrees with the derived one.
#[must_use]
pub fn has_drift(product: &Product) -> bool {
    let Some(stored) = product.discount_percentage.and_then(round_percent) else {
        return false;
    };
    let derived = product
        .sale_price
        .and_then(|sale| derived_percentage(product.price, sale))
        .unwrap_or(0);
    stored != derived
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, sale: Option<i64>, stored: Option<i64>) -> Product {
        Product {
            price: Decimal::from(price),
            sale_price: sale.map(Decimal::from),
            discount_percentage: stored.map(Decimal::from),
            ..Product::default()
        }
    }

    #[test]
    fn test_badge_derived_from_prices() {
        assert_eq!(badge(&product(1000, Some(750), None)).as_deref(), Some("-25%"));
    }

    #[test]
    fn test_stored_percentage_wins() {
        assert_eq!(badge(&product(1000, Some(750), Some(30))).as_deref(), Some("-30%"));
        assert!(has_drift(&product(1000, Some(750), Some(30))));
        assert!(!has_drift(&product(1000, Some(750), Some(25))));
    }

    #[test]
    fn test_no_badge_without_sale() {
        assert_eq!(badge(&product(1000, None, Some(20))), None);
        assert_eq!(badge(&product(1000, Some(0), None)), None);
        assert_eq!(badge(&product(1000, Some(1200), None)), None);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 12.5% off
        assert_eq!(derived_percentage(Decimal::from(800), Decimal::from(700)), Some(13));
        // 33.33% off
        assert_eq!(derived_percentage(Decimal::from(3000), Decimal::from(2000)), Some(33));
    }
}
