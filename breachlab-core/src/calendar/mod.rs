//! Market calendar: is the market open on a date, and if not, why and when
//! does it reopen.
//!
//! Weekends are a pure function of the weekday. Holidays come from a
//! [`HolidayTable`] lookup. The weekend check runs first, so a holiday that
//! lands on a weekend reports the weekday.
//!
//! The forward search for an open date is bounded: more than
//! [`MAX_CONSECUTIVE_CLOSED_DAYS`] closed days in a row means the holiday
//! table or the weekday logic is broken, and the search fails with
//! [`CalendarError::ClosedRunExceeded`].

pub mod holidays;

pub use holidays::HolidayTable;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::fmt;
use thiserror::Error;

/// Longest run of consecutive closed days the search tolerates.
pub const MAX_CONSECUTIVE_CLOSED_DAYS: u32 = 6;

/// Calendar failures. Only structural problems end up here; a closed
/// market is reported through [`ClosureReason`], never as an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error(
        "calendar invariant violated: no open market day within {days} days of {start} \
         (holiday table or weekday logic is inconsistent)"
    )]
    ClosedRunExceeded { start: NaiveDate, days: u32 },

    #[error("invalid holiday date '{0}' (expected YYYY-MM-DD)")]
    InvalidHolidayDate(String),

    #[error("holiday file: {0}")]
    HolidayFile(String),

    #[error("date arithmetic overflowed after {0}")]
    DateOverflow(NaiveDate),
}

/// Why the market is closed on a date (or that it is open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureReason {
    /// Saturday or Sunday.
    Weekend(Weekday),
    /// A dated entry of the holiday table.
    NamedHoliday(String),
    Open,
}

impl ClosureReason {
    pub fn is_closed(&self) -> bool {
        !matches!(self, ClosureReason::Open)
    }

    /// Reason string as written to output rows: the weekday name, the
    /// holiday label, or empty when open.
    pub fn label(&self) -> &str {
        match self {
            ClosureReason::Weekend(Weekday::Sat) => "Saturday",
            ClosureReason::Weekend(Weekday::Sun) => "Sunday",
            ClosureReason::Weekend(_) => "",
            ClosureReason::NamedHoliday(name) => name,
            ClosureReason::Open => "",
        }
    }
}

impl fmt::Display for ClosureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trading-day calendar for a single market.
#[derive(Debug, Clone)]
pub struct MarketCalendar {
    holidays: HolidayTable,
    max_closed_run: u32,
}

impl MarketCalendar {
    pub fn new(holidays: HolidayTable) -> Self {
        Self {
            holidays,
            max_closed_run: MAX_CONSECUTIVE_CLOSED_DAYS,
        }
    }

    /// Override the closed-run bound. Intended for tests.
    pub fn with_max_closed_run(mut self, days: u32) -> Self {
        self.max_closed_run = days;
        self
    }

    pub fn holidays(&self) -> &HolidayTable {
        &self.holidays
    }

    pub fn max_closed_run(&self) -> u32 {
        self.max_closed_run
    }

    /// Why the market is closed on `date`, or [`ClosureReason::Open`].
    pub fn closure_reason(&self, date: NaiveDate) -> ClosureReason {
        if let wd @ (Weekday::Sat | Weekday::Sun) = date.weekday() {
            return ClosureReason::Weekend(wd);
        }
        match self.holidays.lookup(date) {
            Some(label) => ClosureReason::NamedHoliday(label.to_string()),
            None => ClosureReason::Open,
        }
    }

    /// `(closed, reason)` for `date`.
    pub fn is_closed(&self, date: NaiveDate) -> (bool, ClosureReason) {
        let reason = self.closure_reason(date);
        (reason.is_closed(), reason)
    }

    pub fn is_open(&self, date: NaiveDate) -> bool {
        !self.closure_reason(date).is_closed()
    }

    /// First open date reachable from `date` by zero or more one-day steps.
    ///
    /// Returns `date` itself when it is open.
    pub fn next_open_date(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        let mut candidate = date;
        let mut advanced = 0u32;
        while self.closure_reason(candidate).is_closed() {
            advanced += 1;
            if advanced > self.max_closed_run {
                return Err(CalendarError::ClosedRunExceeded {
                    start: date,
                    days: advanced,
                });
            }
            candidate = next_day(candidate)?;
        }
        Ok(candidate)
    }
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self::new(HolidayTable::default())
    }
}

/// `date + 1 day`.
pub(crate) fn next_day(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    date.checked_add_days(Days::new(1))
        .ok_or(CalendarError::DateOverflow(date))
}
