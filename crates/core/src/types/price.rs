//! Currency codes and prices.
//!
//! Every amount is persisted in the base currency ([`CurrencyCode::BASE`],
//! Sri Lankan rupees). Other currencies are display-only projections computed
//! by [`crate::catalog::currency`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::currency;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (rupees, dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the base currency.
    #[must_use]
    pub const fn base(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BASE)
    }

    /// Format for display, e.g. `Rs 4,500.00` or `$13.50`.
    #[must_use]
    pub fn display(&self) -> String {
        currency::format(self.amount, self.currency_code)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes offered in the currency selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum CurrencyCode {
    #[default]
    LKR,
    USD,
    EUR,
    GBP,
    INR,
    AUD,
    CAD,
    AED,
    SGD,
    JPY,
}

impl CurrencyCode {
    /// The currency all amounts are stored in.
    pub const BASE: Self = Self::LKR;

    /// Every selectable currency, base first.
    pub const ALL: [Self; 10] = [
        Self::LKR,
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::INR,
        Self::AUD,
        Self::CAD,
        Self::AED,
        Self::SGD,
        Self::JPY,
    ];

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LKR => "LKR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::INR => "INR",
            Self::AUD => "AUD",
            Self::CAD => "CAD",
            Self::AED => "AED",
            Self::SGD => "SGD",
            Self::JPY => "JPY",
        }
    }

    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::LKR => "Rs",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::INR => "₹",
            Self::AUD => "A$",
            Self::CAD => "C$",
            Self::AED => "AED",
            Self::SGD => "S$",
            Self::JPY => "¥",
        }
    }

    /// Flag emoji shown in the currency selector.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::LKR => "🇱🇰",
            Self::USD => "🇺🇸",
            Self::EUR => "🇪🇺",
            Self::GBP => "🇬🇧",
            Self::INR => "🇮🇳",
            Self::AUD => "🇦🇺",
            Self::CAD => "🇨🇦",
            Self::AED => "🇦🇪",
            Self::SGD => "🇸🇬",
            Self::JPY => "🇯🇵",
        }
    }

    /// Human-readable currency name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LKR => "Sri Lankan Rupee",
            Self::USD => "US Dollar",
            Self::EUR => "Euro",
            Self::GBP => "British Pound",
            Self::INR => "Indian Rupee",
            Self::AUD => "Australian Dollar",
            Self::CAD => "Canadian Dollar",
            Self::AED => "UAE Dirham",
            Self::SGD => "Singapore Dollar",
            Self::JPY => "Japanese Yen",
        }
    }

    /// Number of decimal places shown when formatting.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }

    /// Hardcoded fallback rate: units of this currency per 1 LKR.
    #[must_use]
    pub fn default_rate(self) -> Decimal {
        match self {
            Self::LKR => Decimal::ONE,
            Self::USD => Decimal::new(33, 4),
            Self::EUR => Decimal::new(31, 4),
            Self::GBP => Decimal::new(26, 4),
            Self::INR => Decimal::new(28, 2),
            Self::AUD => Decimal::new(51, 4),
            Self::CAD => Decimal::new(46, 4),
            Self::AED => Decimal::new(121, 4),
            Self::SGD => Decimal::new(44, 4),
            Self::JPY => Decimal::new(50, 2),
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unsupported currency: {wanted}"))
    }
}
