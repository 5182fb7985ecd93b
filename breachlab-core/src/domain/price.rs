//! Daily stock-price rows.

use super::{CalendarDate, CompanyId};
use serde::{Deserialize, Serialize};

/// Daily OHLCV row of the stock-data table, keyed by (company, date).
///
/// Alignment only reads `open` and `close`; the remaining columns are
/// carried for the duplicate check and for round-tripping the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub company_id: CompanyId,
    pub date: CalendarDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl PriceRecord {
    /// Lookup key used by price indexes.
    pub fn key(&self) -> (CompanyId, CalendarDate) {
        (self.company_id, self.date)
    }
}
