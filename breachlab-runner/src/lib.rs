//! BreachLab Runner — orchestration over `breachlab-core`.
//!
//! - TOML configuration for data, output, holidays and the market-data API
//! - Stock analysis: retrieve, align disclosure dates, export the workbook
//! - Disclosure summary per company
//! - Company listing and stock prices joined with the Dow Jones index
//! - Price fetch into the store and duplicate-row cleanup

pub mod analysis;
pub mod companies;
pub mod config;
pub mod dedupe;
pub mod export;
pub mod fetch;
pub mod stock_index;
pub mod summary;

pub use analysis::{align_disclosures, retrieve, run_stock_analysis, AnalysisOutcome, RunError};
pub use companies::{run_company_info, CompanyReport, COMPANY_SHEET};
pub use config::{AnalysisConfig, ConfigError, PolygonConfig};
pub use dedupe::{run_duplicate_check, DuplicateReport};
pub use export::{export_alignment, ExportPaths, SHEET_NAME};
pub use fetch::{fetch_company_prices, select_companies, FetchReport};
pub use stock_index::{
    join_stock_with_index, run_stock_with_index, StockIndexReport, StockIndexRow, STOCK_INDEX_SHEET,
};
pub use summary::{run_disclosure_summary, summarize_disclosures, DisclosureSummary, SummaryReport};

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<AnalysisConfig>();
        require_sync::<AnalysisConfig>();
        require_send::<AnalysisOutcome>();
        require_sync::<AnalysisOutcome>();
        require_send::<RunError>();
        require_sync::<RunError>();
    }

    #[test]
    fn default_config_is_valid() {
        AnalysisConfig::default().validate().unwrap();
    }
}
