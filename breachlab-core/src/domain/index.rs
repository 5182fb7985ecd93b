//! Daily quotes of the Dow Jones index.

use super::CalendarDate;
use serde::{Deserialize, Serialize};

/// One trading day of the index, keyed by date.
///
/// `change_percent` is the day-over-day change in percent (`0.52` means
/// +0.52%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub date: CalendarDate,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub change_percent: f64,
}
