//! Holiday table — dated market closures other than weekends.
//!
//! The default table holds a single entry (Memorial Day 2021). A TOML file
//! with a `[holidays]` table can replace it:
//!
//! ```toml
//! [holidays]
//! "2021-05-31" = "Memorial Day"
//! "2021-07-05" = "Independence Day (observed)"
//! ```

use super::CalendarError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The one closure date seeded into the default table.
pub const MEMORIAL_DAY_2021: (i32, u32, u32) = (2021, 5, 31);

/// Lookup from calendar date to holiday label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayTable {
    entries: BTreeMap<NaiveDate, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HolidayFile {
    holidays: BTreeMap<String, String>,
}

impl HolidayTable {
    /// A table with no holidays (weekends only).
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace a holiday.
    pub fn insert(&mut self, date: NaiveDate, label: impl Into<String>) {
        self.entries.insert(date, label.into());
    }

    /// Builder-style [`HolidayTable::insert`].
    pub fn with(mut self, date: NaiveDate, label: impl Into<String>) -> Self {
        self.insert(date, label);
        self
    }

    /// Holiday label for `date`, if any.
    pub fn lookup(&self, date: NaiveDate) -> Option<&str> {
        self.entries.get(&date).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Holidays in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &str)> {
        self.entries.iter().map(|(d, l)| (*d, l.as_str()))
    }

    /// Load a table from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CalendarError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CalendarError::HolidayFile(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a table from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, CalendarError> {
        let file: HolidayFile = toml::from_str(content)
            .map_err(|e| CalendarError::HolidayFile(format!("parse holiday TOML: {e}")))?;

        let mut table = Self::empty();
        for (raw, label) in file.holidays {
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| CalendarError::InvalidHolidayDate(raw.clone()))?;
            table.insert(date, label);
        }
        Ok(table)
    }

    /// Serialize the table to TOML.
    pub fn to_toml(&self) -> Result<String, CalendarError> {
        let file = HolidayFile {
            holidays: self
                .entries
                .iter()
                .map(|(d, l)| (d.format("%Y-%m-%d").to_string(), l.clone()))
                .collect(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| CalendarError::HolidayFile(format!("serialize holidays: {e}")))
    }
}

impl Default for HolidayTable {
    fn default() -> Self {
        let (y, m, d) = MEMORIAL_DAY_2021;
        let mut table = Self::empty();
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            table.insert(date, "Memorial Day");
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn default_table_has_only_memorial_day() {
        let table = HolidayTable::default();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(d(2021, 5, 31)), Some("Memorial Day"));
        assert_eq!(table.lookup(d(2022, 5, 30)), None);
    }

    #[test]
    fn parses_toml_table() {
        let table = HolidayTable::from_toml(
            r#"
[holidays]
"2021-05-31" = "Memorial Day"
"2021-07-05" = "Independence Day (observed)"
"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup(d(2021, 7, 5)),
            Some("Independence Day (observed)")
        );
    }

    #[test]
    fn bad_date_key_is_rejected() {
        let err = HolidayTable::from_toml("[holidays]\n\"31/05/2021\" = \"Memorial Day\"\n")
            .unwrap_err();
        assert!(matches!(err, CalendarError::InvalidHolidayDate(ref s) if s == "31/05/2021"));
    }

    #[test]
    fn toml_roundtrip() {
        let table = HolidayTable::default().with(d(2021, 12, 24), "Christmas (observed)");
        let text = table.to_toml().unwrap();
        assert_eq!(HolidayTable::from_toml(&text).unwrap(), table);
    }
}
