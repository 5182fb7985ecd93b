//! AlignmentRow — one output row of the disclosure analysis.

use super::CalendarDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Reason attached to the row for the first trading day after a closure.
pub const REASON_MARKET_REOPEN: &str = "Market reopen";

/// Reason attached when the market was open but no price row exists.
pub const REASON_NO_STOCK_DATA: &str = "No stock data available";

/// A price column value: a number, or explicitly not applicable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceField {
    Value(f64),
    NotApplicable,
}

impl PriceField {
    pub fn value(&self) -> Option<f64> {
        match self {
            PriceField::Value(v) => Some(*v),
            PriceField::NotApplicable => None,
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, PriceField::NotApplicable)
    }
}

/// Sheet rendering: two decimals, or `N/A`.
impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceField::Value(v) => write!(f, "{v:.2}"),
            PriceField::NotApplicable => f.write_str("N/A"),
        }
    }
}

// Serialized as the bare number or the literal "N/A".
impl Serialize for PriceField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PriceField::Value(v) => serializer.serialize_f64(*v),
            PriceField::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for PriceField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(v) => Ok(PriceField::Value(v)),
            Raw::Text(s) if s == "N/A" => Ok(PriceField::NotApplicable),
            Raw::Text(s) => s
                .parse::<f64>()
                .map(PriceField::Value)
                .map_err(|_| serde::de::Error::custom(format!("invalid price field: {s}"))),
        }
    }
}

/// One row of the "Disclosure Dates" output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRow {
    pub company_name: String,
    /// Effective date: the disclosure date, or the reopen date on a reopen row.
    pub date: CalendarDate,
    pub market_closed: bool,
    /// Closure reason, reopen marker, no-data marker, or empty.
    pub reason: String,
    pub opening_price: PriceField,
    pub closing_price: PriceField,
}

impl AlignmentRow {
    /// Row for a day the market was closed.
    pub fn closure(company_name: &str, date: CalendarDate, reason: &str) -> Self {
        Self {
            company_name: company_name.to_string(),
            date,
            market_closed: true,
            reason: reason.to_string(),
            opening_price: PriceField::NotApplicable,
            closing_price: PriceField::NotApplicable,
        }
    }

    /// Row for the first trading day after a closure.
    pub fn reopen(company_name: &str, date: CalendarDate) -> Self {
        Self {
            company_name: company_name.to_string(),
            date,
            market_closed: false,
            reason: REASON_MARKET_REOPEN.to_string(),
            opening_price: PriceField::NotApplicable,
            closing_price: PriceField::NotApplicable,
        }
    }

    /// Row for an open day with a matching price record.
    pub fn priced(company_name: &str, date: CalendarDate, open: f64, close: f64) -> Self {
        Self {
            company_name: company_name.to_string(),
            date,
            market_closed: false,
            reason: String::new(),
            opening_price: PriceField::Value(open),
            closing_price: PriceField::Value(close),
        }
    }

    /// Row for an open day without a price record.
    pub fn no_data(company_name: &str, date: CalendarDate) -> Self {
        Self {
            company_name: company_name.to_string(),
            date,
            market_closed: false,
            reason: REASON_NO_STOCK_DATA.to_string(),
            opening_price: PriceField::NotApplicable,
            closing_price: PriceField::NotApplicable,
        }
    }
}
