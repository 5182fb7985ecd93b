//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over market-data sources (the Polygon
//! aggregates API, test stubs) so the fetch pipeline can swap implementations
//! and mock for tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily bar from a market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Volume-weighted average price, when the provider reports it.
    pub vwap: Option<f64>,
    /// Number of trades in the bar, when the provider reports it.
    pub trades: Option<u64>,
}

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output as-is.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("bad request (400): invalid parameters for {symbol}")]
    BadRequest { symbol: String },

    #[error("authentication failed ({status}): invalid API key or insufficient permissions")]
    AuthenticationRequired { status: u16 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider server error ({status}) for {symbol}")]
    ServerError { symbol: String, status: u16 },

    #[error("unexpected HTTP status {status} for {symbol}: {body}")]
    UnexpectedStatus {
        symbol: String,
        status: u16,
        body: String,
    },

    #[error("max retries reached for {symbol} after {attempts} attempts (last status {last_status})")]
    RetriesExhausted {
        symbol: String,
        attempts: u32,
        last_status: u16,
    },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no API key available in the key pool")]
    NoApiKey,

    #[error("data source not found: {path}")]
    SourceMissing { path: String },

    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
}

/// Trait for market-data providers.
///
/// Implementations handle the specifics of talking to one source; the store
/// sits above this trait and providers know nothing about it.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, from: NaiveDate, to: NaiveDate)
        -> Result<FetchResult, DataError>;
}

/// Progress callback for multi-company fetches.
pub trait FetchProgress: Send {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<usize, DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<usize, DataError>,
    ) {
        match result {
            Ok(bars) => println!("  OK: {symbol} ({bars} bars)"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Progress reporter that discards every event.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: &Result<usize, DataError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
