//! DisclosureRecord — one public disclosure event for one company.

use super::{CalendarDate, CompanyId};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A disclosure joined with its company's display fields.
///
/// The timestamp may carry a time of day; alignment only ever looks at
/// [`DisclosureRecord::disclosure_date`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclosureRecord {
    pub company_id: CompanyId,
    pub company_name: String,
    pub symbol: String,
    pub disclosed_at: NaiveDateTime,
}

impl DisclosureRecord {
    /// Record for a disclosure made at midnight on `date`.
    pub fn on_date(
        company_id: CompanyId,
        company_name: impl Into<String>,
        symbol: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            company_id,
            company_name: company_name.into(),
            symbol: symbol.into(),
            disclosed_at: date.and_time(chrono::NaiveTime::MIN),
        }
    }

    /// The disclosure date with any time component stripped.
    pub fn disclosure_date(&self) -> CalendarDate {
        self.disclosed_at.date()
    }
}

/// Parse a disclosure timestamp as written by upstream exports.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`
/// and RFC 3339 (the offset is dropped, the local wall time is kept).
pub fn parse_disclosure_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plain_date_parses_to_midnight() {
        let ts = parse_disclosure_timestamp("2021-05-31").unwrap();
        assert_eq!(ts.date(), d(2021, 5, 31));
        assert_eq!(ts.time(), chrono::NaiveTime::MIN);
    }

    #[test]
    fn time_component_is_stripped_from_date() {
        let ts = parse_disclosure_timestamp("2021-06-04 17:45:12").unwrap();
        let rec = DisclosureRecord {
            company_id: 1,
            company_name: "Acme".into(),
            symbol: "ACME".into(),
            disclosed_at: ts,
        };
        assert_eq!(rec.disclosure_date(), d(2021, 6, 4));
    }

    #[test]
    fn rfc3339_keeps_local_wall_date() {
        let ts = parse_disclosure_timestamp("2021-06-04T23:30:00-05:00").unwrap();
        assert_eq!(ts.date(), d(2021, 6, 4));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_disclosure_timestamp("June 4th").is_none());
        assert!(parse_disclosure_timestamp("").is_none());
    }
}
