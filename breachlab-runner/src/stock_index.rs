//! Daily stock prices side by side with the Dow Jones index.
//!
//! Inner join of companies, stock data and index quotes on the trading
//! date. Days missing from either table produce no row.

use crate::analysis::{retrieve, RunError};
use crate::config::AnalysisConfig;
use crate::export::{sheet_path, write_sheet};
use crate::fetch::select_companies;
use breachlab_core::data::CsvStore;
use breachlab_core::domain::{CalendarDate, Company, CompanyId, IndexQuote, PriceRecord};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

/// Sheet holding the joined rows.
pub const STOCK_INDEX_SHEET: &str = "Stock Price and Dow Jones";

/// Column headers of the joined sheet.
pub const STOCK_INDEX_COLUMNS: [&str; 13] = [
    "Company ID",
    "Company Name",
    "Date",
    "Stock Open",
    "Stock High",
    "Stock Close",
    "Stock Volume",
    "Dow Jones Price",
    "Dow Jones Open",
    "Dow Jones High",
    "Dow Jones Low",
    "Dow Jones Volume",
    "Dow Jones Change %",
];

/// One company's trading day paired with the index on the same date.
#[derive(Debug, Clone, PartialEq)]
pub struct StockIndexRow {
    pub company_id: CompanyId,
    pub company_name: String,
    pub date: CalendarDate,
    pub stock_open: f64,
    pub stock_high: f64,
    pub stock_close: f64,
    pub stock_volume: u64,
    pub index: IndexQuote,
}

impl StockIndexRow {
    fn sheet_record(&self) -> Vec<String> {
        vec![
            self.company_id.to_string(),
            self.company_name.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.stock_open.to_string(),
            self.stock_high.to_string(),
            self.stock_close.to_string(),
            self.stock_volume.to_string(),
            self.index.price.to_string(),
            self.index.open.to_string(),
            self.index.high.to_string(),
            self.index.low.to_string(),
            self.index.volume.to_string(),
            self.index.change_percent.to_string(),
        ]
    }
}

/// Join prices with index quotes on date, keeping only the selected
/// companies. Ordered by date, then company id.
pub fn join_stock_with_index(
    companies: Vec<Company>,
    prices: &[PriceRecord],
    quotes: &[IndexQuote],
    ids: Option<&[CompanyId]>,
) -> Vec<StockIndexRow> {
    let names: HashMap<CompanyId, String> = select_companies(companies, ids)
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let by_date: HashMap<CalendarDate, &IndexQuote> = quotes.iter().map(|q| (q.date, q)).collect();

    let mut rows: Vec<StockIndexRow> = prices
        .iter()
        .filter_map(|p| {
            let name = names.get(&p.company_id)?;
            let quote = by_date.get(&p.date)?;
            Some(StockIndexRow {
                company_id: p.company_id,
                company_name: name.clone(),
                date: p.date,
                stock_open: p.open,
                stock_high: p.high,
                stock_close: p.close,
                stock_volume: p.volume,
                index: (*quote).clone(),
            })
        })
        .collect();
    rows.sort_by_key(|r| (r.date, r.company_id));
    rows
}

/// Joined rows plus the sheet they were exported to.
#[derive(Debug, Clone)]
pub struct StockIndexReport {
    pub rows: Vec<StockIndexRow>,
    pub sheet_csv: PathBuf,
}

/// Join the store's stock data with the Dow Jones table and export the
/// sheet. `ids` limits the companies; `None` keeps all of them.
pub fn run_stock_with_index(
    config: &AnalysisConfig,
    ids: Option<&[CompanyId]>,
) -> Result<StockIndexReport, RunError> {
    let store = CsvStore::new(&config.data_dir);
    let companies = retrieve("companies", || store.companies());
    let prices = retrieve("stock data", || store.stock_data());
    let quotes = retrieve("dow jones", || store.dow_jones());

    let rows = join_stock_with_index(companies, &prices, &quotes, ids);
    if rows.is_empty() {
        return Err(RunError::UpstreamUnavailable {
            source_name: "stock and index data",
        });
    }

    let sheet_csv = sheet_path(&config.workbook_dir(), STOCK_INDEX_SHEET)?;
    write_sheet(
        &sheet_csv,
        &STOCK_INDEX_COLUMNS,
        rows.iter().map(StockIndexRow::sheet_record),
    )?;
    info!(rows = rows.len(), sheet = %sheet_csv.display(), "exported stock and index sheet");

    Ok(StockIndexReport { rows, sheet_csv })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, day).unwrap()
    }

    fn company(id: CompanyId, name: &str) -> Company {
        Company {
            id,
            name: name.into(),
            location: "Ohio".into(),
            symbol: name.to_uppercase(),
        }
    }

    fn price(company_id: CompanyId, day: u32) -> PriceRecord {
        PriceRecord {
            company_id,
            date: d(day),
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: 10.5,
            adj_close: 10.5,
            volume: 100,
        }
    }

    fn quote(day: u32) -> IndexQuote {
        IndexQuote {
            date: d(day),
            price: 34000.0,
            open: 33900.0,
            high: 34100.0,
            low: 33800.0,
            volume: 2.5e8,
            change_percent: 0.3,
        }
    }

    #[test]
    fn orders_by_date_then_company() {
        let companies = vec![company(2, "Bolt"), company(1, "Acme")];
        let prices = vec![price(2, 2), price(1, 2), price(2, 1), price(1, 1)];
        let rows = join_stock_with_index(companies, &prices, &[quote(2), quote(1)], None);
        let keys: Vec<(NaiveDate, CompanyId)> = rows.iter().map(|r| (r.date, r.company_id)).collect();
        assert_eq!(keys, vec![(d(1), 1), (d(1), 2), (d(2), 1), (d(2), 2)]);
        assert_eq!(rows[0].company_name, "Acme");
    }

    #[test]
    fn days_without_a_quote_are_dropped() {
        let rows = join_stock_with_index(
            vec![company(1, "Acme")],
            &[price(1, 1), price(1, 4)],
            &[quote(1)],
            None,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, quote(1));
    }

    #[test]
    fn unknown_companies_and_filtered_ids_are_dropped() {
        let companies = vec![company(1, "Acme"), company(2, "Bolt")];
        let prices = vec![price(1, 1), price(2, 1), price(9, 1)];
        let rows = join_stock_with_index(companies, &prices, &[quote(1)], Some(&[2][..]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company_id, 2);
    }
}
