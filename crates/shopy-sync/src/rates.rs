//! # Exchange Rate Sources
//!
//! Lookups of the multiplier from USD to a display currency.
//!
//! ## Rate Feed Format (apilayer "live")
//! ```text
//! GET <url>?access_key=<key>&format=1&source=USD&currencies=EUR
//!
//! {
//!   "success": true,
//!   "source": "USD",
//!   "quotes": { "USDEUR": 0.85 }
//! }
//! ```
//! A `"success": false` body, a missing `USD<code>` quote, or a quote that is
//! not a positive finite number is a lookup failure.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{parse_http_url, FeedConfig};
use crate::error::{RateLookupError, SyncResult};
use crate::http::{Cancel, FeedClient};
use shopy_core::{CurrencyCode, ExchangeContext, BASE_CURRENCY};

/// Something that can quote USD → `currency`.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns how many units of `currency` one USD buys.
    async fn usd_rate(&self, currency: &CurrencyCode, cancel: &Cancel)
        -> Result<f64, RateLookupError>;
}

// =============================================================================
// HTTP Rate Feed
// =============================================================================

/// Rate feed speaking the apilayer "live" format.
#[derive(Debug, Clone)]
pub struct HttpRateFeed {
    url: Url,
    access_key: Option<String>,
    client: FeedClient,
}

impl HttpRateFeed {
    pub fn new(url: Url, access_key: Option<String>, client: FeedClient) -> Self {
        HttpRateFeed {
            url,
            access_key,
            client,
        }
    }

    /// Builds the feed from configuration.
    pub fn from_config(config: &FeedConfig) -> SyncResult<Self> {
        let url = parse_http_url(&config.rates.url)?;
        let client = FeedClient::new(&config.http)?;
        Ok(HttpRateFeed::new(url, config.rates.access_key.clone(), client))
    }

    /// The request URL for one currency.
    pub fn request_url(&self, currency: &CurrencyCode) -> Url {
        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(ref key) = self.access_key {
                query.append_pair("access_key", key);
            }
            query
                .append_pair("format", "1")
                .append_pair("source", BASE_CURRENCY)
                .append_pair("currencies", currency.as_str());
        }
        url
    }
}

#[async_trait]
impl RateSource for HttpRateFeed {
    async fn usd_rate(
        &self,
        currency: &CurrencyCode,
        cancel: &Cancel,
    ) -> Result<f64, RateLookupError> {
        let url = self.request_url(currency);
        debug!(currency = %currency, "Requesting exchange rate");

        let body = self.client.get(&url, cancel).await?;
        let rate = parse_quote(&body, currency)?;

        debug!(currency = %currency, rate, "Exchange rate received");
        Ok(rate)
    }
}

/// Extracts the `USD<code>` quote from a rate feed response.
pub fn parse_quote(body: &[u8], currency: &CurrencyCode) -> Result<f64, RateLookupError> {
    let pair = format!("{}{}", BASE_CURRENCY, currency);

    let json: Value =
        serde_json::from_slice(body).map_err(|e| RateLookupError::Malformed(e.to_string()))?;

    if json.get("success").and_then(Value::as_bool) == Some(false) {
        let info = json
            .pointer("/error/info")
            .and_then(Value::as_str)
            .unwrap_or("request rejected")
            .to_string();
        warn!(pair = %pair, info = %info, "Rate service rejected request");
        return Err(RateLookupError::Service(info));
    }

    let quotes = json
        .get("quotes")
        .and_then(Value::as_object)
        .ok_or_else(|| RateLookupError::Malformed("missing \"quotes\" object".to_string()))?;

    let quote = quotes
        .get(&pair)
        .ok_or_else(|| RateLookupError::MissingQuote(pair.clone()))?;

    let rate = quote
        .as_f64()
        .ok_or_else(|| RateLookupError::Malformed(format!("quote {} is not a number", pair)))?;

    if !ExchangeContext::is_usable_rate(rate) {
        return Err(RateLookupError::InvalidRate { pair, rate });
    }

    Ok(rate)
}

// =============================================================================
// Static Rates
// =============================================================================

/// A fixed rate table, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    rates: HashMap<String, f64>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rate for `code`.
    pub fn with_rate(mut self, code: &str, rate: f64) -> Self {
        self.rates.insert(code.to_ascii_uppercase(), rate);
        self
    }
}

#[async_trait]
impl RateSource for StaticRates {
    async fn usd_rate(
        &self,
        currency: &CurrencyCode,
        cancel: &Cancel,
    ) -> Result<f64, RateLookupError> {
        if cancel.is_cancelled() {
            return Err(RateLookupError::Unreachable("lookup cancelled".to_string()));
        }

        let rate = *self
            .rates
            .get(currency.as_str())
            .ok_or_else(|| RateLookupError::UnsupportedCurrency(currency.to_string()))?;

        if !ExchangeContext::is_usable_rate(rate) {
            return Err(RateLookupError::InvalidRate {
                pair: format!("{}{}", BASE_CURRENCY, currency),
                rate,
            });
        }

        Ok(rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
