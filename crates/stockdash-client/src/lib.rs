#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/stockdash/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! HTTP fetcher for the stock analysis service.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stockdash_client::{ClientConfig, HttpFetcher};
//! use stockdash_core::{ResourceFetcher, ResourceKey, Ticker, TimePeriod};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new(ClientConfig::default())?;
//!
//!     let key = ResourceKey::History(Ticker::new("AAPL"), TimePeriod::OneYear);
//!     let history = fetcher.fetch(&key).await?;
//!
//!     Ok(())
//! }
//! ```

/// Client configuration.
pub mod config;

pub use config::ClientConfig;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value, json};
use std::fmt;
use stockdash_core::{DashError, NestedRecord, ResourceFetcher, ResourceKey, ResourceKind, Result};
use tracing::{debug, instrument};

/// Fetches dashboard resources from the analysis service over HTTP.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    config: ClientConfig,
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl HttpFetcher {
    /// Create a fetcher with a client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Network`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DashError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a fetcher with a custom HTTP client.
    ///
    /// The client's own timeout and headers apply; only `base_url` is read
    /// from `config`.
    #[must_use]
    pub const fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn fetch(&self, key: &ResourceKey) -> Result<NestedRecord> {
        if key.ticker().is_empty() {
            return Err(DashError::MissingInput("a ticker symbol is required".into()));
        }

        let (endpoint, query) = request_for(key);
        let url = self.config.url(endpoint);
        debug!(url = %url, "Analysis service request");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| DashError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DashError::Network(e.to_string()))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Analysis service response");
        classify_response(key.kind(), status, &body)
    }
}

/// Returns the endpoint and query parameters that serve `key`.
#[must_use]
pub fn request_for(key: &ResourceKey) -> (&'static str, Vec<(&'static str, String)>) {
    let symbol = ("symbol", key.ticker().to_string());
    match key {
        ResourceKey::Snapshot(_) => ("bulk_stock_data", vec![symbol]),
        ResourceKey::AiSummary(_) => ("analyze", vec![symbol]),
        ResourceKey::PriceQuote(_) => ("cur_stock_price", vec![symbol]),
        ResourceKey::History(_, period) => (
            "stock_history",
            vec![symbol, ("timePeriod", period.to_string())],
        ),
        ResourceKey::Valuation(_, params) => (
            "valuate",
            vec![
                symbol,
                ("file", params.filing.to_string()),
                ("growthType", params.growth.to_string()),
                ("timePeriod", params.period.to_string()),
                ("analyze", params.style.to_string()),
            ],
        ),
    }
}

/// Turns a raw response into a payload or an error.
///
/// # Errors
///
/// - Non-2xx with an `error` field or a non-empty body: [`DashError::Backend`]
/// - Non-2xx with an empty body: [`DashError::Network`]
/// - 2xx with an `error` field: [`DashError::Backend`]
/// - 2xx that is not JSON or lacks the fields `kind` needs:
///   [`DashError::InvalidResponse`]
pub fn classify_response(kind: ResourceKind, status: StatusCode, body: &str) -> Result<NestedRecord> {
    if !status.is_success() {
        let structured = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| error_message(&value));
        if let Some(message) = structured {
            return Err(DashError::Backend(message));
        }
        let text = body.trim();
        if text.is_empty() {
            return Err(DashError::Network(format!("HTTP {status}")));
        }
        return Err(DashError::Backend(text.to_string()));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| DashError::InvalidResponse(format!("{kind} body is not JSON: {e}")))?;

    if let Some(message) = error_message(&value) {
        return Err(DashError::Backend(message));
    }

    check_shape(kind, &value)?;

    match kind {
        ResourceKind::PriceQuote => Ok(reshape_quote(&value)),
        _ => Ok(value),
    }
}

fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn check_shape(kind: ResourceKind, value: &Value) -> Result<()> {
    let ok = match kind {
        ResourceKind::Snapshot => value.is_object(),
        ResourceKind::History => value.get("History").is_some_and(Value::is_array),
        ResourceKind::AiSummary => value.get("LLM analysis").is_some_and(Value::is_string),
        ResourceKind::PriceQuote => value.get("Current price").is_some_and(Value::is_number),
        ResourceKind::Valuation => {
            value.get("Growth data").is_some() || value.get("Analysis of stock").is_some()
        }
    };

    if ok {
        Ok(())
    } else {
        Err(DashError::InvalidResponse(format!(
            "{kind} response is missing its expected fields"
        )))
    }
}

/// Rewrites a price quote into the snapshot's `Market data` fields.
///
/// `Price change` arrives as `[absolute, percent]`; either element may be
/// missing, in which case the field is left out.
fn reshape_quote(value: &Value) -> NestedRecord {
    let mut market = Map::new();
    if let Some(price) = value.get("Current price") {
        market.insert("Price".into(), price.clone());
    }

    let change = value.get("Price change").and_then(Value::as_array);
    let element = |i: usize| change.and_then(|c| c.get(i)).filter(|v| v.is_number());
    if let Some(abs) = element(0) {
        market.insert("Price change".into(), abs.clone());
    }
    if let Some(pct) = element(1) {
        market.insert("Price change percent".into(), pct.clone());
    }

    json!({ "Market data": market })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use stockdash_core::{
        ErrorKind, FilingType, GrowthType, Ticker, TimePeriod, ValuationParams, ValuationStyle,
    };

    fn fetcher(server: &MockServer) -> HttpFetcher {
        HttpFetcher::new(ClientConfig::default().with_base_url(server.base_url())).unwrap()
    }

    #[test]
    fn test_request_mapping() {
        let ticker = Ticker::new("aapl");
        let (endpoint, query) = request_for(&ResourceKey::Snapshot(ticker.clone()));
        assert_eq!(endpoint, "bulk_stock_data");
        assert_eq!(query, vec![("symbol", "AAPL".to_string())]);

        let params = ValuationParams {
            filing: FilingType::Quarterly,
            growth: GrowthType::Forward,
            period: TimePeriod::TwoYears,
            style: ValuationStyle::Pegy,
        };
        let (endpoint, query) = request_for(&ResourceKey::Valuation(ticker, params));
        assert_eq!(endpoint, "valuate");
        assert_eq!(
            query,
            vec![
                ("symbol", "AAPL".to_string()),
                ("file", "10-Q".to_string()),
                ("growthType", "forward".to_string()),
                ("timePeriod", "2y".to_string()),
                ("analyze", "PEGY".to_string()),
            ]
        );
    }

    #[test]
    fn test_debug_shows_base_url_only() {
        let fetcher = HttpFetcher::with_client(Client::new(), ClientConfig::default());
        let debug = format!("{fetcher:?}");
        assert!(debug.contains("127.0.0.1:5000"));
        assert!(!debug.contains("user_agent"));
    }

    #[test]
    fn test_non_success_classification() {
        let err = classify_response(
            ResourceKind::Snapshot,
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "No data found for symbol"}"#,
        )
        .unwrap_err();
        assert_eq!(err, DashError::Backend("No data found for symbol".into()));

        let err = classify_response(ResourceKind::Valuation, StatusCode::BAD_REQUEST, "Missing data fields\n")
            .unwrap_err();
        assert_eq!(err, DashError::Backend("Missing data fields".into()));

        let err = classify_response(ResourceKind::History, StatusCode::BAD_GATEWAY, "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_success_classification() {
        let err = classify_response(ResourceKind::Snapshot, StatusCode::OK, "<html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);

        let err = classify_response(ResourceKind::AiSummary, StatusCode::OK, r#"{"error": "quota"}"#)
            .unwrap_err();
        assert_eq!(err, DashError::Backend("quota".into()));

        let ok = classify_response(ResourceKind::Snapshot, StatusCode::OK, r#"{"error": null, "a": 1}"#);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_shape_checks() {
        let cases = [
            (ResourceKind::Snapshot, "[1, 2]"),
            (ResourceKind::History, r#"{"History": {}}"#),
            (ResourceKind::AiSummary, r#"{"LLM analysis": 3}"#),
            (ResourceKind::PriceQuote, r#"{"Current price": "189"}"#),
            (ResourceKind::Valuation, r#"{"Other": {}}"#),
        ];
        for (kind, body) in cases {
            let err = classify_response(kind, StatusCode::OK, body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidResponse, "{kind}: {body}");
        }

        let valuation = classify_response(
            ResourceKind::Valuation,
            StatusCode::OK,
            r#"{"Analysis of stock": {"Type": false}}"#,
        );
        assert!(valuation.is_ok());
    }

    #[test]
    fn test_price_quote_reshape() {
        let value = classify_response(
            ResourceKind::PriceQuote,
            StatusCode::OK,
            r#"{"Current price": 189.25, "Price change": [1.5, 0.8]}"#,
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"Market data": {"Price": 189.25, "Price change": 1.5, "Price change percent": 0.8}})
        );

        let partial =
            classify_response(ResourceKind::PriceQuote, StatusCode::OK, r#"{"Current price": 10}"#)
                .unwrap();
        assert_eq!(partial, json!({"Market data": {"Price": 10}}));
    }

    #[tokio::test]
    async fn test_empty_ticker_is_missing_input() {
        // Nothing listens here; the request must never be sent.
        let fetcher = HttpFetcher::new(ClientConfig::default().with_base_url("http://127.0.0.1:9"))
            .unwrap();
        let err = fetcher
            .fetch(&ResourceKey::AiSummary(Ticker::new("  ")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
    }

    #[tokio::test]
    async fn test_fetch_history() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/stock_history")
                    .query_param("symbol", "AAPL")
                    .query_param("timePeriod", "6mo");
                then.status(200).json_body(json!({
                    "History": [{"Date": "Mon, 01 Jan 2024 00:00:00 GMT", "Close": 185.2}]
                }));
            })
            .await;

        let key = ResourceKey::History(Ticker::new("AAPL"), TimePeriod::SixMonths);
        let value = fetcher(&server).fetch(&key).await.unwrap();

        mock.assert_async().await;
        assert_eq!(value["History"][0]["Close"], json!(185.2));
    }

    #[tokio::test]
    async fn test_fetch_backend_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/analyze");
                then.status(500).json_body(json!({"error": "LLM unavailable"}));
            })
            .await;

        let err = fetcher(&server)
            .fetch(&ResourceKey::AiSummary(Ticker::new("MSFT")))
            .await
            .unwrap_err();
        assert_eq!(err, DashError::Backend("LLM unavailable".into()));
    }

    #[tokio::test]
    async fn test_fetch_price_quote() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/cur_stock_price")
                    .query_param("symbol", "MSFT");
                then.status(200)
                    .json_body(json!({"Current price": 415.1, "Price change": [-2.3, -0.55]}));
            })
            .await;

        let value = fetcher(&server)
            .fetch(&ResourceKey::PriceQuote(Ticker::new("msft")))
            .await
            .unwrap();
        assert_eq!(value["Market data"]["Price"], json!(415.1));
        assert_eq!(value["Market data"]["Price change percent"], json!(-0.55));
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let fetcher = HttpFetcher::new(ClientConfig::default().with_base_url("http://127.0.0.1:9"))
            .unwrap();
        let err = fetcher
            .fetch(&ResourceKey::Snapshot(Ticker::new("AAPL")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    }
}
