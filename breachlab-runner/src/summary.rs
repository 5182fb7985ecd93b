//! Per-company disclosure summary.

use crate::analysis::{retrieve, RunError};
use crate::config::AnalysisConfig;
use crate::export::write_atomic;
use anyhow::Context;
use breachlab_core::data::CsvStore;
use breachlab_core::domain::{CalendarDate, CompanyId, DisclosureRecord};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Sheet holding each disclosure joined with its company summary.
pub const SUMMARY_SHEET: &str = "Disclosure Summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureSummary {
    pub company_id: CompanyId,
    pub company_name: String,
    pub symbol: String,
    pub disclosures: usize,
    pub most_recent: CalendarDate,
}

/// Count disclosures and find the latest disclosure date per company,
/// ordered by company id.
pub fn summarize_disclosures(records: &[DisclosureRecord]) -> Vec<DisclosureSummary> {
    let mut by_company: BTreeMap<CompanyId, DisclosureSummary> = BTreeMap::new();
    for record in records {
        let date = record.disclosure_date();
        by_company
            .entry(record.company_id)
            .and_modify(|s| {
                s.disclosures += 1;
                s.most_recent = s.most_recent.max(date);
            })
            .or_insert_with(|| DisclosureSummary {
                company_id: record.company_id,
                company_name: record.company_name.clone(),
                symbol: record.symbol.clone(),
                disclosures: 1,
                most_recent: date,
            });
    }
    by_company.into_values().collect()
}

/// Summary rows plus the sheet they were exported to.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub disclosures: Vec<DisclosureRecord>,
    pub summaries: Vec<DisclosureSummary>,
    pub sheet_csv: PathBuf,
}

/// Summarize the store's disclosures and export the joined sheet.
pub fn run_disclosure_summary(config: &AnalysisConfig) -> Result<SummaryReport, RunError> {
    let store = CsvStore::new(&config.data_dir);
    let disclosures = retrieve("disclosures", || store.disclosures());
    if disclosures.is_empty() {
        return Err(RunError::UpstreamUnavailable {
            source_name: "disclosure source",
        });
    }

    let summaries = summarize_disclosures(&disclosures);
    let dir = config.workbook_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create workbook directory {}", dir.display()))?;
    let sheet_csv = dir.join(format!("{SUMMARY_SHEET}.csv"));
    write_summary_csv(&sheet_csv, &disclosures, &summaries)?;
    info!(companies = summaries.len(), sheet = %sheet_csv.display(), "exported disclosure summary");

    Ok(SummaryReport {
        disclosures,
        summaries,
        sheet_csv,
    })
}

/// One line per disclosure with its company's count and latest date.
fn write_summary_csv(
    path: &std::path::Path,
    disclosures: &[DisclosureRecord],
    summaries: &[DisclosureSummary],
) -> anyhow::Result<()> {
    let by_id: BTreeMap<CompanyId, &DisclosureSummary> =
        summaries.iter().map(|s| (s.company_id, s)).collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "ID",
        "Name",
        "Symbol",
        "Disclosure Date",
        "# Disclosures",
        "Most Recent",
    ])?;
    for record in disclosures {
        let summary = by_id
            .get(&record.company_id)
            .with_context(|| format!("no summary for company {}", record.company_id))?;
        writer.write_record([
            record.company_id.to_string(),
            record.company_name.clone(),
            record.symbol.clone(),
            display_date(record.disclosure_date()),
            summary.disclosures.to_string(),
            display_date(summary.most_recent),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush CSV buffer: {e}"))?;
    write_atomic(path, &bytes)
}

/// `Mar 01, 2021` style, as shown in the disclosure listing.
pub fn display_date(date: CalendarDate) -> String {
    date.format("%b %d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn counts_and_latest_per_company() {
        let records = vec![
            DisclosureRecord::on_date(2, "Beta", "BETA", d(2021, 3, 1)),
            DisclosureRecord::on_date(1, "Acme", "ACME", d(2021, 12, 1)),
            DisclosureRecord::on_date(1, "Acme", "ACME", d(2021, 2, 15)),
        ];
        let summaries = summarize_disclosures(&records);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].company_id, 1);
        assert_eq!(summaries[0].disclosures, 2);
        assert_eq!(summaries[0].most_recent, d(2021, 12, 1));
        assert_eq!(summaries[1].disclosures, 1);
    }

    #[test]
    fn latest_compares_dates_not_labels() {
        // "Mar" sorts after "Dec" as text.
        let records = vec![
            DisclosureRecord::on_date(1, "Acme", "ACME", d(2021, 3, 1)),
            DisclosureRecord::on_date(1, "Acme", "ACME", d(2021, 12, 1)),
        ];
        assert_eq!(summarize_disclosures(&records)[0].most_recent, d(2021, 12, 1));
        assert_eq!(display_date(d(2021, 3, 1)), "Mar 01, 2021");
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(summarize_disclosures(&[]).is_empty());
    }
}
