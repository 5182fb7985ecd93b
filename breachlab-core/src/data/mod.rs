//! Data sources: the market-data client, the CSV store, and the
//! duplicate check that keeps the stock-data table one row per key.

pub mod dedupe;
pub mod download;
pub mod key_pool;
pub mod polygon;
pub mod provider;
pub mod store;

pub use dedupe::{find_duplicates, remove_duplicates, DuplicateGroup};
pub use download::{fetch_company_prices, to_price_records, FetchSummary};
pub use key_pool::ApiKeyPool;
pub use polygon::PolygonClient;
pub use provider::{
    DataError, FetchProgress, FetchResult, PriceProvider, RawBar, SilentProgress, StdoutProgress,
};
pub use store::CsvStore;
