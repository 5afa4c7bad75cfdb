//! Currency projection.
//!
//! Amounts are stored in LKR. A [`RateTable`] holds units of each target
//! currency per 1 LKR; [`convert`] multiplies and [`format`] renders the
//! result with the currency's symbol, thousands separators and decimal
//! places, rounding half away from zero.
//!
//! The table starts as hardcoded defaults and is replaced wholesale when an
//! admin refreshes it from the rate API. Refreshed tables carry `fetchedAt`
//! and are reported stale once older than the configured TTL.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::Singleton;
use crate::types::CurrencyCode;

/// Default time a refreshed table stays fresh.
pub const DEFAULT_RATES_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("no exchange rate for {0}")]
    MissingRate(CurrencyCode),
}

/// Exchange rates relative to the base currency
/// (singleton `settings/exchange_rates`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub base: CurrencyCode,
    pub rates: BTreeMap<CurrencyCode, Decimal>,
    /// When the rates were fetched; `None` for the built-in defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: String,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Singleton for RateTable {
    const COLLECTION: &'static str = "settings";
    const DOC_ID: &'static str = "exchange_rates";
}

impl RateTable {
    /// The hardcoded fallback table.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            base: CurrencyCode::BASE,
            rates: CurrencyCode::ALL
                .into_iter()
                .map(|c| (c, c.default_rate()))
                .collect(),
            fetched_at: None,
            source: "defaults".to_string(),
        }
    }

    /// Build a table from fetched rates. Non-positive rates are dropped and
    /// the base currency is always present at 1.
    #[must_use]
    pub fn from_rates(
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
        fetched_at: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        let mut rates: BTreeMap<CurrencyCode, Decimal> = rates
            .into_iter()
            .filter(|(_, rate)| *rate > Decimal::ZERO)
            .collect();
        rates.insert(CurrencyCode::BASE, Decimal::ONE);
        Self {
            base: CurrencyCode::BASE,
            rates,
            fetched_at: Some(fetched_at),
            source: source.into(),
        }
    }

    /// Units of `code` per 1 unit of base.
    #[must_use]
    pub fn rate(&self, code: CurrencyCode) -> Option<Decimal> {
        if code == self.base {
            return Some(Decimal::ONE);
        }
        self.rates.get(&code).copied()
    }

    /// Currencies this table can convert to, in selector order.
    #[must_use]
    pub fn available(&self) -> Vec<CurrencyCode> {
        CurrencyCode::ALL
            .into_iter()
            .filter(|c| self.rate(*c).is_some())
            .collect()
    }

    /// Whether the table was fetched more than `ttl` ago. The built-in
    /// defaults are never stale.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.fetched_at.is_some_and(|at| now - at > ttl)
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.fetched_at.is_none()
    }
}

/// Convert a base-currency amount into `target`.
///
/// # Errors
///
/// Returns [`CurrencyError::MissingRate`] if the table has no rate for
/// `target`.
pub fn convert(
    amount: Decimal,
    target: CurrencyCode,
    rates: &RateTable,
) -> Result<Decimal, CurrencyError> {
    rates
        .rate(target)
        .map(|rate| amount * rate)
        .ok_or(CurrencyError::MissingRate(target))
}

/// Format an amount in `currency`, e.g. `Rs 4,500.00`, `$13.50`, `¥2,250`.
#[must_use]
pub fn format(amount: Decimal, currency: CurrencyCode) -> String {
    let places = currency.decimal_places();
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let text = format!("{:.*}", places as usize, rounded.abs());
    let (whole, fraction) = text.split_once('.').map_or((text.as_str(), None), |(w, f)| (w, Some(f)));

    let mut out = String::with_capacity(text.len() + 8);
    if negative {
        out.push('-');
    }
    let symbol = currency.symbol();
    out.push_str(symbol);
    if symbol.chars().last().is_some_and(char::is_alphabetic) {
        out.push(' ');
    }
    out.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Convert then format.
///
/// # Errors
///
/// Returns [`CurrencyError::MissingRate`] if the table has no rate for
/// `target`.
pub fn project(
    amount: Decimal,
    target: CurrencyCode,
    rates: &RateTable,
) -> Result<String, CurrencyError> {
    convert(amount, target, rates).map(|converted| format(converted, target))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
