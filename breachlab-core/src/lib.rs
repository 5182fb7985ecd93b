//! BreachLab Core — market calendar, disclosure alignment, price sources.
//!
//! This crate contains the date-alignment engine and its data plumbing:
//! - Domain types (companies, disclosures, price records, alignment rows)
//! - Market calendar with weekend rules and a swappable holiday table
//! - Disclosure aligner (closure + reopen rows, or a price-matched row)
//! - Price lookup trait and in-memory price index
//! - Polygon aggregates client with an injectable API key pool
//! - CSV store and duplicate detection for the stock-data table

pub mod align;
pub mod calendar;
pub mod data;
pub mod domain;

pub use align::{Alignment, DisclosureAligner, PriceIndex, PriceLookup};
pub use calendar::{CalendarError, ClosureReason, HolidayTable, MarketCalendar};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with the parallel aligner are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::DisclosureRecord>();
        require_sync::<domain::DisclosureRecord>();
        require_send::<domain::PriceRecord>();
        require_sync::<domain::PriceRecord>();
        require_send::<domain::AlignmentRow>();
        require_sync::<domain::AlignmentRow>();

        require_send::<MarketCalendar>();
        require_sync::<MarketCalendar>();
        require_send::<PriceIndex>();
        require_sync::<PriceIndex>();

        require_send::<data::ApiKeyPool>();
        require_sync::<data::ApiKeyPool>();
        require_send::<data::PolygonClient>();
        require_sync::<data::PolygonClient>();
    }

    /// Architecture contract: the aligner only reads prices through
    /// `PriceLookup`, so any point-lookup source can stand in for the index.
    #[test]
    fn aligner_accepts_trait_object_lookup() {
        let date = chrono::NaiveDate::from_ymd_opt(2021, 6, 2).unwrap();
        let index = PriceIndex::from_records(vec![domain::PriceRecord {
            company_id: 1,
            date,
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: 10.5,
            adj_close: 10.5,
            volume: 100,
        }]);
        let prices: &dyn PriceLookup = &index;
        let cal = MarketCalendar::default();
        let aligner = DisclosureAligner::new(&cal, prices);

        let record = domain::DisclosureRecord::on_date(1, "Acme", "ACME", date);
        let rows = aligner.align(&record).unwrap().into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].opening_price, domain::PriceField::Value(10.0));
    }
}
