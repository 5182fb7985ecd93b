//! Disclosure alignment: map each disclosure onto the market calendar and
//! the price table.
//!
//! Per record:
//! - market closed on the disclosure date → a closure row plus a reopen
//!   row for the next trading day (prices not applicable on both)
//! - market open, price row present → one row with open/close prices
//! - market open, no price row → one "No stock data available" row
//!
//! Closed markets and missing prices are data, not errors. The only error
//! is a [`CalendarError`] from the bounded reopen search, which aborts the
//! whole run.

pub mod lookup;

pub use lookup::{PriceIndex, PriceLookup};

use crate::calendar::{next_day, CalendarError, ClosureReason, MarketCalendar};
use crate::domain::{AlignmentRow, CalendarDate, DisclosureRecord};
use rayon::prelude::*;
use tracing::{debug, error};

/// Outcome of aligning one disclosure.
#[derive(Debug, Clone, PartialEq)]
pub enum Alignment {
    /// Market closed on the disclosure date.
    Closed {
        closure: AlignmentRow,
        reopen: AlignmentRow,
    },
    /// Market open and a price record matched.
    Priced(AlignmentRow),
    /// Market open but no price record for the day.
    NoData(AlignmentRow),
}

impl Alignment {
    pub fn into_rows(self) -> Vec<AlignmentRow> {
        match self {
            Alignment::Closed { closure, reopen } => vec![closure, reopen],
            Alignment::Priced(row) | Alignment::NoData(row) => vec![row],
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Alignment::Closed { .. } => 2,
            Alignment::Priced(_) | Alignment::NoData(_) => 1,
        }
    }
}

/// Aligns disclosures against a calendar and a price source.
pub struct DisclosureAligner<'a, P: PriceLookup + ?Sized> {
    calendar: &'a MarketCalendar,
    prices: &'a P,
}

impl<'a, P: PriceLookup + ?Sized> DisclosureAligner<'a, P> {
    pub fn new(calendar: &'a MarketCalendar, prices: &'a P) -> Self {
        Self { calendar, prices }
    }

    /// Align a single disclosure.
    pub fn align(&self, record: &DisclosureRecord) -> Result<Alignment, CalendarError> {
        let date = record.disclosure_date();
        let name = record.company_name.as_str();

        let reason = self.calendar.closure_reason(date);
        if reason.is_closed() {
            return self.align_closed(name, date, &reason);
        }

        match self.prices.price_on(record.company_id, date) {
            Some(price) => Ok(Alignment::Priced(AlignmentRow::priced(
                name,
                date,
                price.open,
                price.close,
            ))),
            None => {
                debug!(company = name, %date, "no stock data for open market day");
                Ok(Alignment::NoData(AlignmentRow::no_data(name, date)))
            }
        }
    }

    fn align_closed(
        &self,
        name: &str,
        date: CalendarDate,
        reason: &ClosureReason,
    ) -> Result<Alignment, CalendarError> {
        let reopen_date = self.reopen_date(date)?;
        debug!(company = name, %date, reason = reason.label(), %reopen_date, "market closed");
        Ok(Alignment::Closed {
            closure: AlignmentRow::closure(name, date, reason.label()),
            reopen: AlignmentRow::reopen(name, reopen_date),
        })
    }

    /// First trading day after a closed `disclosure_date`.
    ///
    /// Starts at the day after the disclosure and re-derives the next open
    /// date from successive start points until the result moves past the
    /// disclosure date. With a non-empty search start this resolves on the
    /// first pass; the outer loop is bounded by the same closed-run limit
    /// as the calendar.
    fn reopen_date(&self, disclosure_date: CalendarDate) -> Result<CalendarDate, CalendarError> {
        let limit = self.calendar.max_closed_run();
        let mut check = next_day(disclosure_date)?;
        for _ in 0..=limit {
            let open = self.calendar.next_open_date(check)?;
            if open != disclosure_date {
                return Ok(open);
            }
            check = next_day(check)?;
        }
        Err(CalendarError::ClosedRunExceeded {
            start: disclosure_date,
            days: limit + 1,
        })
    }

    /// Align every record in input order.
    ///
    /// Stops at the first calendar violation.
    pub fn align_all(
        &self,
        records: &[DisclosureRecord],
    ) -> Result<Vec<AlignmentRow>, CalendarError> {
        let mut rows = Vec::with_capacity(records.len() * 2);
        for record in records {
            let alignment = self.align(record).map_err(|e| {
                error!(company = %record.company_name, date = %record.disclosure_date(), "{e}");
                e
            })?;
            rows.extend(alignment.into_rows());
        }
        Ok(rows)
    }

    /// Parallel [`DisclosureAligner::align_all`]. Records are independent;
    /// output keeps input order, so both produce identical rows.
    pub fn align_all_parallel(
        &self,
        records: &[DisclosureRecord],
    ) -> Result<Vec<AlignmentRow>, CalendarError>
    where
        P: Sync,
    {
        let per_record: Vec<Alignment> = records
            .par_iter()
            .map(|record| self.align(record))
            .collect::<Result<_, _>>()
            .map_err(|e| {
                error!("{e}");
                e
            })?;
        Ok(per_record.into_iter().flat_map(Alignment::into_rows).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HolidayTable;
    use crate::domain::{PriceField, PriceRecord, REASON_MARKET_REOPEN, REASON_NO_STOCK_DATA};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn prices() -> PriceIndex {
        PriceIndex::from_records(vec![PriceRecord {
            company_id: 7,
            date: d(2021, 6, 2),
            open: 101.25,
            high: 104.0,
            low: 100.5,
            close: 103.75,
            adj_close: 103.75,
            volume: 12_000,
        }])
    }

    #[test]
    fn open_day_with_price_yields_one_priced_row() {
        let cal = MarketCalendar::default();
        let prices = prices();
        let aligner = DisclosureAligner::new(&cal, &prices);
        let rec = DisclosureRecord::on_date(7, "Acme", "ACME", d(2021, 6, 2));

        let rows = aligner.align(&rec).unwrap().into_rows();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].market_closed);
        assert_eq!(rows[0].reason, "");
        assert_eq!(rows[0].opening_price, PriceField::Value(101.25));
        assert_eq!(rows[0].closing_price, PriceField::Value(103.75));
    }

    #[test]
    fn open_day_without_price_yields_no_data_row() {
        let cal = MarketCalendar::default();
        let prices = prices();
        let aligner = DisclosureAligner::new(&cal, &prices);
        let rec = DisclosureRecord::on_date(8, "Other", "OTH", d(2021, 6, 2));

        let alignment = aligner.align(&rec).unwrap();
        assert!(matches!(alignment, Alignment::NoData(_)));
        let rows = alignment.into_rows();
        assert_eq!(rows[0].reason, REASON_NO_STOCK_DATA);
        assert!(rows[0].opening_price.is_not_applicable());
        assert!(rows[0].closing_price.is_not_applicable());
    }

    #[test]
    fn holiday_yields_closure_and_reopen() {
        let cal = MarketCalendar::default();
        let prices = prices();
        let aligner = DisclosureAligner::new(&cal, &prices);
        let rec = DisclosureRecord::on_date(7, "Acme", "ACME", d(2021, 5, 31));

        let rows = aligner.align(&rec).unwrap().into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, d(2021, 5, 31));
        assert!(rows[0].market_closed);
        assert_eq!(rows[0].reason, "Memorial Day");
        assert_eq!(rows[1].date, d(2021, 6, 1));
        assert!(!rows[1].market_closed);
        assert_eq!(rows[1].reason, REASON_MARKET_REOPEN);
        assert!(rows[1].opening_price.is_not_applicable());
    }

    #[test]
    fn closed_day_skips_price_lookup() {
        let cal = MarketCalendar::default();
        // A price row on a Saturday must not be picked up.
        let prices = PriceIndex::from_records(vec![PriceRecord {
            company_id: 7,
            date: d(2021, 6, 5),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            adj_close: 1.0,
            volume: 1,
        }]);
        let aligner = DisclosureAligner::new(&cal, &prices);
        let rec = DisclosureRecord::on_date(7, "Acme", "ACME", d(2021, 6, 5));

        let rows = aligner.align(&rec).unwrap().into_rows();
        assert_eq!(rows[0].reason, "Saturday");
        assert!(rows[0].opening_price.is_not_applicable());
        assert_eq!(rows[1].date, d(2021, 6, 7));
    }

    #[test]
    fn calendar_violation_aborts_run() {
        let holidays = (7..=12).fold(HolidayTable::empty(), |t, day| {
            t.with(d(2021, 6, day), format!("H{day}"))
        });
        let cal = MarketCalendar::new(holidays);
        let prices = PriceIndex::default();
        let aligner = DisclosureAligner::new(&cal, &prices);
        let records = vec![
            DisclosureRecord::on_date(1, "Fine", "FN", d(2021, 6, 2)),
            DisclosureRecord::on_date(2, "Stuck", "ST", d(2021, 6, 5)),
        ];

        let err = aligner.align_all(&records).unwrap_err();
        assert!(matches!(err, CalendarError::ClosedRunExceeded { .. }));
    }

    #[test]
    fn parallel_matches_sequential() {
        let cal = MarketCalendar::default();
        let prices = prices();
        let aligner = DisclosureAligner::new(&cal, &prices);
        let records: Vec<_> = (0..40)
            .map(|i| {
                DisclosureRecord::on_date(
                    7,
                    format!("Co{i}"),
                    "CO",
                    d(2021, 5, 20) + chrono::Days::new(i),
                )
            })
            .collect();

        let seq = aligner.align_all(&records).unwrap();
        let par = aligner.align_all_parallel(&records).unwrap();
        assert_eq!(seq, par);
    }
}
