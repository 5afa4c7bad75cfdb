//! WhatsApp order links.
//!
//! Orders are placed by opening `https://wa.me/<digits>?text=<message>` with
//! a prefilled message; no API is called.

use rust_decimal::Decimal;

use super::currency::{self, RateTable};
use crate::models::Product;
use crate::types::CurrencyCode;

/// Country code applied to local numbers written with a leading zero.
pub const DEFAULT_COUNTRY_CODE: &str = "94";

/// Digits-only international form of a phone number.
///
/// A 10-digit local number starting with `0` (e.g. `077 123 4567`) gets the
/// default country code. Returns `None` when no digits remain.
#[must_use]
pub fn normalize_number(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    match digits.strip_prefix('0') {
        Some(rest) if digits.len() == 10 => Some(format!("{DEFAULT_COUNTRY_CODE}{rest}")),
        _ => Some(digits),
    }
}

/// `https://wa.me/<digits>?text=<percent-encoded message>`.
#[must_use]
pub fn deep_link(number: &str, message: &str) -> Option<String> {
    let digits = normalize_number(number)?;
    Some(format!(
        "https://wa.me/{digits}?text={}",
        urlencoding::encode(message)
    ))
}

/// A product the customer is asking about, with their selections.
#[derive(Debug, Clone)]
pub struct OrderLine<'a> {
    pub product: &'a Product,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
    pub quantity: u32,
}

impl OrderLine<'_> {
    fn unit_price(&self) -> Decimal {
        self.product.effective_price()
    }
}

fn price_text(amount: Decimal, display: CurrencyCode, rates: &RateTable) -> String {
    let base = currency::format(amount, CurrencyCode::BASE);
    if display == CurrencyCode::BASE {
        return base;
    }
    currency::project(amount, display, rates)
        .map_or_else(|_| base.clone(), |shown| format!("{base} (~{shown})"))
}

/// Message for a single-product inquiry.
#[must_use]
pub fn product_message(
    line: &OrderLine<'_>,
    product_url: &str,
    display: CurrencyCode,
    rates: &RateTable,
) -> String {
    let mut msg = format!("Hi Elegant Closet! I'd like to order:\n\n*{}*", line.product.name);
    if !line.product.sku.is_empty() {
        msg.push_str(&format!("\nSKU: {}", line.product.sku));
    }
    if let Some(size) = line.size {
        msg.push_str(&format!("\nSize: {size}"));
    }
    if let Some(color) = line.color {
        msg.push_str(&format!("\nColor: {color}"));
    }
    msg.push_str(&format!("\nQuantity: {}", line.quantity.max(1)));
    msg.push_str(&format!(
        "\nPrice: {}",
        price_text(line.unit_price(), display, rates)
    ));
    msg.push_str(&format!("\n\n{product_url}"));
    msg
}
