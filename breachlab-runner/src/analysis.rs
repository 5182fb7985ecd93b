//! Stock-analysis run: retrieve upstream data, align, export.

use crate::config::{AnalysisConfig, ConfigError};
use crate::export::{export_alignment, ExportPaths};
use breachlab_core::calendar::{CalendarError, MarketCalendar};
use breachlab_core::data::{CsvStore, DataError};
use breachlab_core::domain::{AlignmentRow, DisclosureRecord, PriceRecord, REASON_NO_STOCK_DATA};
use breachlab_core::{DisclosureAligner, PriceIndex};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from a runner command.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),
    #[error("{source_name} unavailable: no records retrieved, analysis skipped")]
    UpstreamUnavailable { source_name: &'static str },
    #[error("export failed: {0:#}")]
    Export(#[from] anyhow::Error),
}

/// Result of a completed analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub disclosures: usize,
    pub rows: Vec<AlignmentRow>,
    pub paths: ExportPaths,
    /// blake3 of the exported rows; equal inputs give equal hashes.
    pub rows_hash: String,
}

impl AnalysisOutcome {
    pub fn closed_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.market_closed).count()
    }

    pub fn priced_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| !r.opening_price.is_not_applicable())
            .count()
    }

    pub fn missing_price_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.reason == REASON_NO_STOCK_DATA)
            .count()
    }
}

/// Run an upstream query, turning a failure into an empty collection.
///
/// Failures and empty results are logged; callers decide whether empty
/// input is fatal.
pub fn retrieve<T>(label: &str, query: impl FnOnce() -> Result<Vec<T>, DataError>) -> Vec<T> {
    match query() {
        Ok(rows) if rows.is_empty() => {
            warn!(source = label, "no records retrieved");
            rows
        }
        Ok(rows) => {
            info!(source = label, count = rows.len(), "retrieved records");
            rows
        }
        Err(e) => {
            warn!(source = label, "retrieval failed: {e}");
            Vec::new()
        }
    }
}

/// Align disclosures against prices with the given calendar.
pub fn align_disclosures(
    calendar: &MarketCalendar,
    disclosures: &[DisclosureRecord],
    prices: Vec<PriceRecord>,
    parallel: bool,
) -> Result<Vec<AlignmentRow>, CalendarError> {
    let index = PriceIndex::from_records(prices);
    let aligner = DisclosureAligner::new(calendar, &index);
    if parallel {
        aligner.align_all_parallel(disclosures)
    } else {
        aligner.align_all(disclosures)
    }
}

/// Retrieve disclosures and stock data from the configured store, align
/// them, and export the workbook sheet.
///
/// When either source is empty the analysis is skipped and
/// [`RunError::UpstreamUnavailable`] is returned.
pub fn run_stock_analysis(config: &AnalysisConfig) -> Result<AnalysisOutcome, RunError> {
    let calendar = config.calendar()?;
    let store = CsvStore::new(&config.data_dir);

    let disclosures = retrieve("disclosures", || store.disclosures());
    if disclosures.is_empty() {
        return Err(RunError::UpstreamUnavailable {
            source_name: "disclosure source",
        });
    }
    let prices = retrieve("stock data", || store.stock_data());
    if prices.is_empty() {
        return Err(RunError::UpstreamUnavailable {
            source_name: "price source",
        });
    }

    info!(
        disclosures = disclosures.len(),
        prices = prices.len(),
        parallel = config.parallel,
        "aligning disclosure dates"
    );
    let rows = align_disclosures(&calendar, &disclosures, prices, config.parallel)?;

    let paths = export_alignment(&config.output_dir, &config.workbook, &rows)?;
    info!(rows = rows.len(), sheet = %paths.sheet_csv.display(), "exported alignment");

    let rows_hash = rows_hash(&rows)?;
    Ok(AnalysisOutcome {
        disclosures: disclosures.len(),
        rows,
        paths,
        rows_hash,
    })
}

/// Content hash of a row set.
pub fn rows_hash(rows: &[AlignmentRow]) -> anyhow::Result<String> {
    let bytes = serde_json::to_vec(rows)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
