//! Fetch orchestrator: pulls daily bars for a set of companies with
//! progress reporting and converts them into price records.

use super::provider::{DataError, FetchProgress, PriceProvider, RawBar};
use crate::domain::{Company, CompanyId, PriceRecord};
use chrono::NaiveDate;

/// Fetch bars for every company over `[from, to]`.
///
/// A failing symbol is recorded in the summary and does not stop the batch.
pub fn fetch_company_prices(
    provider: &dyn PriceProvider,
    companies: &[Company],
    from: NaiveDate,
    to: NaiveDate,
    progress: &dyn FetchProgress,
) -> FetchSummary {
    let total = companies.len();
    let mut records = Vec::new();
    let mut succeeded = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, company) in companies.iter().enumerate() {
        progress.on_start(&company.symbol, i, total);

        let result = provider
            .fetch(&company.symbol, from, to)
            .map(|fetched| to_price_records(company.id, &fetched.bars));

        match result {
            Ok(rows) => {
                progress.on_complete(&company.symbol, i, total, &Ok(rows.len()));
                records.extend(rows);
                succeeded += 1;
            }
            Err(e) => {
                let reported: Result<usize, DataError> = Err(e);
                progress.on_complete(&company.symbol, i, total, &reported);
                if let Err(e) = reported {
                    errors.push((company.symbol.clone(), e));
                }
            }
        }
    }

    let failed = errors.len();
    progress.on_batch_complete(succeeded, failed, total);

    FetchSummary {
        total,
        succeeded,
        failed,
        records,
        errors,
    }
}

/// Convert provider bars into stock-data rows for one company.
///
/// Bars come from an adjusted feed, so `adj_close` equals `close`.
pub fn to_price_records(company_id: CompanyId, bars: &[RawBar]) -> Vec<PriceRecord> {
    bars.iter()
        .map(|bar| PriceRecord {
            company_id,
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            adj_close: bar.close,
            volume: bar.volume.max(0.0).round() as u64,
        })
        .collect()
}

/// Summary of a batch fetch.
#[derive(Debug)]
pub struct FetchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records: Vec<PriceRecord>,
    pub errors: Vec<(String, DataError)>,
}

impl FetchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
