//! Tracked companies.

use super::CompanyId;
use serde::{Deserialize, Serialize};

/// A row of the company table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub location: String,
    /// Ticker symbol used for market-data requests.
    pub symbol: String,
}
