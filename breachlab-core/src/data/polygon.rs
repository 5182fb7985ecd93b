//! Polygon.io aggregates client.
//!
//! Fetches daily bars from the `/v2/aggs` endpoint. Rate limiting (429) and
//! service unavailability (503) are retried a fixed number of times with a
//! fixed wait; every other error status fails the fetch immediately. Each
//! fetch draws one key from the injected [`ApiKeyPool`].

use super::key_pool::ApiKeyPool;
use super::provider::{DataError, FetchResult, PriceProvider, RawBar};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_WAIT: Duration = Duration::from_secs(5);

/// Aggregates API response envelope.
#[derive(Debug, Deserialize)]
struct AggsResponse {
    #[serde(default)]
    results: Option<Vec<AggBar>>,
    #[serde(default)]
    status: Option<String>,
}

/// One aggregate bar: `t` is the window start in epoch milliseconds.
#[derive(Debug, Deserialize)]
struct AggBar {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
    #[serde(default)]
    vw: Option<f64>,
    #[serde(default)]
    n: Option<u64>,
}

/// Polygon.io market-data client.
pub struct PolygonClient {
    client: reqwest::blocking::Client,
    keys: Arc<ApiKeyPool>,
    base_url: String,
    max_retries: u32,
    retry_wait: Duration,
    multiplier: u32,
    timespan: String,
}

impl PolygonClient {
    pub fn new(keys: Arc<ApiKeyPool>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            keys,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: MAX_RETRIES,
            retry_wait: RETRY_WAIT,
            multiplier: 1,
            timespan: "day".to_string(),
        })
    }

    /// Replace the HTTP client (custom timeouts, proxies).
    pub fn with_http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, max_retries: u32, retry_wait: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_wait = retry_wait;
        self
    }

    pub fn with_range(mut self, multiplier: u32, timespan: impl Into<String>) -> Self {
        self.multiplier = multiplier;
        self.timespan = timespan.into();
        self
    }

    /// Build the aggregates URL for a ticker and date range.
    fn aggs_url(&self, ticker: &str, from: NaiveDate, to: NaiveDate, api_key: &str) -> String {
        format!(
            "{}/v2/aggs/ticker/{ticker}/range/{}/{}/{}/{}\
             ?adjusted=true&sort=asc&limit=120&apiKey={api_key}",
            self.base_url,
            self.multiplier,
            self.timespan,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        )
    }

    /// Parse an aggregates response into RawBars.
    fn parse_response(symbol: &str, resp: AggsResponse) -> Result<Vec<RawBar>, DataError> {
        if let Some(status) = resp.status.as_deref() {
            if status == "ERROR" {
                return Err(DataError::ResponseFormatChanged(format!(
                    "provider reported ERROR status for {symbol}"
                )));
            }
        }

        let results = resp.results.unwrap_or_default();
        let mut bars = Vec::with_capacity(results.len());
        for agg in results {
            let date = chrono::DateTime::from_timestamp_millis(agg.t)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {}", agg.t))
                })?;
            bars.push(RawBar {
                date,
                open: agg.o,
                high: agg.h,
                low: agg.l,
                close: agg.c,
                volume: agg.v,
                vwap: agg.vw,
                trades: agg.n,
            });
        }
        Ok(bars)
    }

    /// Map a non-retryable error status to a DataError.
    fn status_error(symbol: &str, status: StatusCode, body: String) -> DataError {
        match status.as_u16() {
            400 => DataError::BadRequest {
                symbol: symbol.to_string(),
            },
            401 | 403 => DataError::AuthenticationRequired {
                status: status.as_u16(),
            },
            404 => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            500 => DataError::ServerError {
                symbol: symbol.to_string(),
                status: 500,
            },
            code => DataError::UnexpectedStatus {
                symbol: symbol.to_string(),
                status: code,
                body,
            },
        }
    }

    fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
    }

    /// Execute the request, retrying on 429/503.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let api_key = self.keys.next_key()?;
        let url = self.aggs_url(symbol, from, to, &api_key);
        let mut last_status = 0u16;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.retry_wait);
            }

            let resp = self
                .client
                .get(&url)
                .send()
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
            let status = resp.status();

            if status.is_success() {
                let body: AggsResponse = resp.json().map_err(|e| {
                    DataError::ResponseFormatChanged(format!(
                        "failed to parse response for {symbol}: {e}"
                    ))
                })?;
                return Self::parse_response(symbol, body);
            }

            if Self::is_retryable(status) {
                last_status = status.as_u16();
                warn!(
                    symbol,
                    status = last_status,
                    attempt = attempt + 1,
                    wait_secs = self.retry_wait.as_secs_f64(),
                    "retryable provider error"
                );
                continue;
            }

            let body = resp.text().unwrap_or_default();
            return Err(Self::status_error(symbol, status, body));
        }

        Err(DataError::RetriesExhausted {
            symbol: symbol.to_string(),
            attempts: self.max_retries + 1,
            last_status,
        })
    }

    /// Fetch, logging and swallowing every error as "no data".
    pub fn fetch_or_none(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Option<FetchResult> {
        match self.fetch(symbol, from, to) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(symbol, "failed to fetch data: {e}");
                None
            }
        }
    }
}

impl PriceProvider for PolygonClient {
    fn name(&self) -> &str {
        "polygon"
    }

    fn fetch(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(symbol, from, to)?;
        info!(symbol, bars = bars.len(), "fetched aggregates");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PolygonClient {
        PolygonClient::new(Arc::new(ApiKeyPool::new(["k1"]))).unwrap()
    }

    #[test]
    fn url_has_range_and_key() {
        let c = client().with_base_url("http://localhost:9/");
        let url = c.aggs_url(
            "ACME",
            NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 6, 30).unwrap(),
            "secret",
        );
        assert_eq!(
            url,
            "http://localhost:9/v2/aggs/ticker/ACME/range/1/day/2021-05-01/2021-06-30\
             ?adjusted=true&sort=asc&limit=120&apiKey=secret"
        );
    }

    #[test]
    fn parses_results_into_bars() {
        let json = r#"{"status":"OK","results":[
            {"t":1622520000000,"o":10.0,"h":11.0,"l":9.5,"c":10.5,"v":1200,"vw":10.2,"n":40}
        ]}"#;
        let resp: AggsResponse = serde_json::from_str(json).unwrap();
        let bars = PolygonClient::parse_response("ACME", resp).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[0].vwap, Some(10.2));
        assert_eq!(bars[0].trades, Some(40));
    }

    #[test]
    fn missing_results_is_empty() {
        let resp: AggsResponse = serde_json::from_str(r#"{"status":"OK"}"#).unwrap();
        assert!(PolygonClient::parse_response("ACME", resp).unwrap().is_empty());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            PolygonClient::status_error("X", StatusCode::NOT_FOUND, String::new()),
            DataError::SymbolNotFound { .. }
        ));
        assert!(matches!(
            PolygonClient::status_error("X", StatusCode::FORBIDDEN, String::new()),
            DataError::AuthenticationRequired { status: 403 }
        ));
        assert!(!PolygonClient::is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(PolygonClient::is_retryable(StatusCode::SERVICE_UNAVAILABLE));
    }
}
