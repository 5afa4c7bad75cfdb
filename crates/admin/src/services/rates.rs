//! Exchange-rate refresh.
//!
//! Fetches `{"rates": {"USD": 0.0033, ...}}` relative to LKR and saves the
//! supported currencies as the `settings/exchange_rates` singleton. The
//! storefront picks the new table up when its cache expires.

use chrono::{DateTime, Utc};
use elegant_closet_core::catalog::RateTable;
use elegant_closet_core::store::{DocumentStore, StoreError, save_singleton};
use elegant_closet_core::types::CurrencyCode;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum RatesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rates API returned {0}")]
    Rejected(u16),

    #[error("unexpected rates response: {0}")]
    Parse(String),

    #[error("rates response has no supported currencies")]
    Empty,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build a rate table from an API response body.
///
/// Unsupported currency codes and non-numeric rates are skipped.
///
/// # Errors
///
/// Returns `Parse` without a `rates` object, `Empty` when nothing usable
/// remains.
pub fn parse_rates(
    body: &Value,
    fetched_at: DateTime<Utc>,
    source: &str,
) -> Result<RateTable, RatesError> {
    let rates = body
        .get("rates")
        .and_then(Value::as_object)
        .ok_or_else(|| RatesError::Parse("missing rates object".to_string()))?;

    let supported: Vec<(CurrencyCode, Decimal)> = rates
        .iter()
        .filter_map(|(code, rate)| {
            let code = code.parse::<CurrencyCode>().ok()?;
            let rate = Decimal::try_from(rate.as_f64()?).ok()?;
            Some((code, rate))
        })
        .filter(|(code, _)| *code != CurrencyCode::BASE)
        .collect();

    if supported.is_empty() {
        return Err(RatesError::Empty);
    }
    Ok(RateTable::from_rates(supported, fetched_at, source))
}

/// Fetch the latest rates and store them.
///
/// # Errors
///
/// Returns a transport, parse or store error. The stored table is left
/// unchanged on failure.
#[instrument(skip(client, store))]
pub async fn refresh<S: DocumentStore>(
    client: &reqwest::Client,
    store: &S,
    url: &str,
) -> Result<RateTable, RatesError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "Rates API request failed");
        return Err(RatesError::Rejected(status.as_u16()));
    }
    let body: Value = response.json().await?;

    let source = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| url.to_string());
    let table = parse_rates(&body, Utc::now(), &source)?;
    save_singleton(store, &table).await?;

    info!(
        currencies = table.rates.len(),
        source = %table.source,
        "Exchange rates refreshed"
    );
    Ok(table)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_closet_core::store::{InMemoryStore, find_singleton};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_rates_keeps_supported() {
        let body = json!({
            "result": "success",
            "rates": {"LKR": 1, "USD": 0.0033, "EUR": 0.0031, "XAU": 0.000001, "GBP": "n/a"}
        });
        let table = parse_rates(&body, Utc::now(), "open.er-api.com").unwrap();
        assert_eq!(table.rate(CurrencyCode::USD), Some(Decimal::try_from(0.0033).unwrap()));
        assert!(table.rate(CurrencyCode::EUR).is_some());
        assert!(table.rate(CurrencyCode::GBP).is_none());
        assert_eq!(table.rate(CurrencyCode::LKR), Some(Decimal::ONE));
        assert!(!table.is_default());
    }

    #[test]
    fn test_parse_rates_errors() {
        assert!(matches!(
            parse_rates(&json!({"error": "quota"}), Utc::now(), "x"),
            Err(RatesError::Parse(_))
        ));
        assert!(matches!(
            parse_rates(&json!({"rates": {"XAU": 1.0}}), Utc::now(), "x"),
            Err(RatesError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_saved_table_is_found() {
        let store = InMemoryStore::default();
        let table = parse_rates(&json!({"rates": {"USD": 0.0033}}), Utc::now(), "x").unwrap();
        save_singleton(&store, &table).await.unwrap();
        let found: Option<RateTable> = find_singleton(&store).await.unwrap();
        assert_eq!(found.unwrap().source, "x");
    }
}
