//! Company listing export.

use crate::analysis::{retrieve, RunError};
use crate::config::AnalysisConfig;
use crate::export::{sheet_path, write_sheet};
use breachlab_core::data::CsvStore;
use breachlab_core::domain::Company;
use std::path::PathBuf;
use tracing::info;

/// Sheet holding the company table.
pub const COMPANY_SHEET: &str = "Company Info";

/// Column headers of the company sheet, as in the upstream table.
pub const COMPANY_COLUMNS: [&str; 4] = ["CompanyID", "CompanyName", "Location", "StockSymbol"];

/// Companies plus the sheet they were exported to.
#[derive(Debug, Clone)]
pub struct CompanyReport {
    pub companies: Vec<Company>,
    pub sheet_csv: PathBuf,
}

/// Export the store's companies, ordered by id.
pub fn run_company_info(config: &AnalysisConfig) -> Result<CompanyReport, RunError> {
    let store = CsvStore::new(&config.data_dir);
    let companies = retrieve("companies", || store.companies());
    if companies.is_empty() {
        return Err(RunError::UpstreamUnavailable {
            source_name: "company source",
        });
    }

    let sheet_csv = sheet_path(&config.workbook_dir(), COMPANY_SHEET)?;
    write_sheet(
        &sheet_csv,
        &COMPANY_COLUMNS,
        companies.iter().map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.location.clone(),
                c.symbol.clone(),
            ]
        }),
    )?;
    info!(companies = companies.len(), sheet = %sheet_csv.display(), "exported company info");

    Ok(CompanyReport {
        companies,
        sheet_csv,
    })
}
