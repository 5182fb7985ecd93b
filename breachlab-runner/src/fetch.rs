//! Fetch daily prices for stored companies and append them to the store.

use crate::analysis::{retrieve, RunError};
use breachlab_core::data::{self, CsvStore, DataError, FetchProgress, PriceProvider};
use breachlab_core::domain::{Company, CompanyId};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Outcome of a fetch into the store.
#[derive(Debug)]
pub struct FetchReport {
    pub companies: usize,
    pub succeeded: usize,
    pub appended: usize,
    pub failures: Vec<(String, DataError)>,
}

/// Companies whose id is in `ids`, or all of them when `ids` is `None`.
///
/// Unknown ids are logged and skipped.
pub fn select_companies(companies: Vec<Company>, ids: Option<&[CompanyId]>) -> Vec<Company> {
    let Some(ids) = ids else {
        return companies;
    };
    for id in ids {
        if !companies.iter().any(|c| c.id == *id) {
            warn!(company_id = id, "unknown company id");
        }
    }
    companies.into_iter().filter(|c| ids.contains(&c.id)).collect()
}

/// Fetch bars over `[from, to]` for the selected companies and append
/// them to the store's stock data. Per-symbol failures are reported, not
/// fatal.
pub fn fetch_company_prices(
    store: &CsvStore,
    provider: &dyn PriceProvider,
    ids: Option<&[CompanyId]>,
    from: NaiveDate,
    to: NaiveDate,
    progress: &dyn FetchProgress,
) -> Result<FetchReport, RunError> {
    let companies = retrieve("companies", || store.companies());
    if companies.is_empty() {
        return Err(RunError::UpstreamUnavailable {
            source_name: "company source",
        });
    }
    let selected = select_companies(companies, ids);
    info!(
        provider = provider.name(),
        companies = selected.len(),
        %from,
        %to,
        "fetching prices"
    );

    let summary = data::fetch_company_prices(provider, &selected, from, to, progress);
    let appended = store.append_stock_data(&summary.records)?;
    for (symbol, e) in &summary.errors {
        warn!(symbol = %symbol, "fetch failed: {e}");
    }

    Ok(FetchReport {
        companies: summary.total,
        succeeded: summary.succeeded,
        appended,
        failures: summary.errors,
    })
}
