//! goldprice.org spot price client.
//!
//! The endpoint returns `{"items": [{"xauPrice": 2050.30, "curr": "USD",
//! "chgXau": 5.20, "pcXau": 0.25, ...}]}`. Only the first item is used.
//! Numeric fields may arrive as JSON numbers or numeric strings.

use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::PriceSourceError;
use crate::domain::quote::{DEFAULT_CURRENCY, MarketStatus, Quote, QuoteSource};

/// HTTP client for the goldprice.org feed.
#[derive(Debug, Clone)]
pub struct GoldPriceClient {
    client: reqwest::Client,
    url: Url,
}

impl GoldPriceClient {
    /// Create a client whose every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, PriceSourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceSourceError::Client(e.to_string()))?;

        Ok(Self { client, url })
    }

    /// Endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch and parse the current spot quote.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, timeout, a non-2xx status or
    /// an unusable payload.
    pub async fn fetch_quote(&self, market_status: MarketStatus) -> Result<Quote, PriceSourceError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(PriceSourceError::from_transport)?;

        if !response.status().is_success() {
            return Err(PriceSourceError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(PriceSourceError::from_transport)?;

        parse_payload(&body, market_status)
    }
}

// =============================================================================
// Payload
// =============================================================================

#[derive(Debug, Deserialize)]
struct GoldPricePayload {
    items: Option<Vec<GoldPriceItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoldPriceItem {
    xau_price: Option<Value>,
    curr: Option<String>,
    chg_xau: Option<Value>,
    pc_xau: Option<Value>,
}

/// Parse a goldprice.org response body into a live quote.
///
/// # Errors
///
/// Returns an error if the body is not JSON, has no items, or the first
/// item lacks a positive numeric `xauPrice`.
pub fn parse_payload(body: &str, market_status: MarketStatus) -> Result<Quote, PriceSourceError> {
    let payload: GoldPricePayload =
        serde_json::from_str(body).map_err(|e| PriceSourceError::InvalidPayload(e.to_string()))?;

    let item = payload
        .items
        .and_then(|items| items.into_iter().next())
        .ok_or(PriceSourceError::EmptyItems)?;

    let price = match item.xau_price {
        None | Some(Value::Null) => return Err(PriceSourceError::MissingPrice),
        Some(value) => decimal_field("xauPrice", &value)?,
    };
    if price <= Decimal::ZERO {
        return Err(PriceSourceError::NonPositivePrice(price));
    }

    let change = optional_decimal_field("chgXau", item.chg_xau.as_ref())?;
    let change_percent = optional_decimal_field("pcXau", item.pc_xau.as_ref())?;
    let currency = item
        .curr
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Ok(Quote::new(
        price,
        currency,
        change,
        change_percent,
        QuoteSource::GoldPriceOrg,
        market_status,
    ))
}

fn optional_decimal_field(name: &str, value: Option<&Value>) -> Result<Decimal, PriceSourceError> {
    match value {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(value) => decimal_field(name, value),
    }
}

fn decimal_field(name: &str, value: &Value) -> Result<Decimal, PriceSourceError> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(PriceSourceError::InvalidPayload(format!(
                "{name} is not numeric: {other}"
            )));
        }
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| PriceSourceError::InvalidPayload(format!("{name} is not numeric: {raw}")))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn parses_full_item() {
        let body = r#"{"items":[{"xauPrice":2050.30,"xagPrice":25.40,"curr":"USD","chgXau":5.20,"pcXau":0.25}]}"#;
        let quote = parse_payload(body, MarketStatus::Open).unwrap();

        assert_eq!(quote.price(), Decimal::new(205_030, 2));
        assert_eq!(quote.currency(), "USD");
        assert_eq!(quote.change(), Decimal::new(520, 2));
        assert_eq!(quote.change_percent(), Decimal::new(25, 2));
        assert_eq!(quote.source(), QuoteSource::GoldPriceOrg);
        assert_eq!(quote.market_status(), MarketStatus::Open);
    }

    #[test]
    fn applies_defaults() {
        let body = r#"{"items":[{"xauPrice":"1999.5"}]}"#;
        let quote = parse_payload(body, MarketStatus::Closed).unwrap();

        assert_eq!(quote.price(), Decimal::new(19_995, 1));
        assert_eq!(quote.currency(), "USD");
        assert_eq!(quote.change(), Decimal::ZERO);
        assert_eq!(quote.change_percent(), Decimal::ZERO);
        assert_eq!(quote.market_status(), MarketStatus::Closed);
    }

    #[test]
    fn uses_first_item_only() {
        let body = r#"{"items":[{"xauPrice":2001,"curr":"EUR"},{"xauPrice":9999}]}"#;
        let quote = parse_payload(body, MarketStatus::Open).unwrap();
        assert_eq!(quote.price(), Decimal::from(2001));
        assert_eq!(quote.currency(), "EUR");
    }

    #[test]
    fn accepts_negative_string_change() {
        let body = r#"{"items":[{"xauPrice":2000,"chgXau":"-3.10","pcXau":-0.15}]}"#;
        let quote = parse_payload(body, MarketStatus::Open).unwrap();
        assert_eq!(quote.change(), Decimal::new(-310, 2));
        assert_eq!(quote.change_percent(), Decimal::new(-15, 2));
    }

    #[test_case(r#"{"items":[]}"# ; "empty items")]
    #[test_case(r#"{"other":1}"# ; "missing items")]
    #[test_case(r#"{"items":null}"# ; "null items")]
    fn rejects_empty_payload(body: &str) {
        let err = parse_payload(body, MarketStatus::Open).unwrap_err();
        assert!(matches!(err, PriceSourceError::EmptyItems));
    }

    #[test]
    fn rejects_missing_price() {
        let err = parse_payload(r#"{"items":[{"curr":"USD"}]}"#, MarketStatus::Open).unwrap_err();
        assert!(matches!(err, PriceSourceError::MissingPrice));
    }

    #[test_case(r#"{"items":[{"xauPrice":"abc"}]}"# ; "non numeric string")]
    #[test_case(r#"{"items":[{"xauPrice":true}]}"# ; "boolean")]
    #[test_case(r#"{"items":[{"xauPrice":2000,"chgXau":"n/a"}]}"# ; "bad change")]
    #[test_case("<html>down</html>" ; "not json")]
    fn rejects_malformed_values(body: &str) {
        let err = parse_payload(body, MarketStatus::Open).unwrap_err();
        assert!(matches!(err, PriceSourceError::InvalidPayload(_)));
    }

    #[test_case(r#"{"items":[{"xauPrice":0}]}"# ; "zero")]
    #[test_case(r#"{"items":[{"xauPrice":"-12.5"}]}"# ; "negative")]
    fn rejects_non_positive_price(body: &str) {
        let err = parse_payload(body, MarketStatus::Open).unwrap_err();
        assert!(matches!(err, PriceSourceError::NonPositivePrice(_)));
    }
}
