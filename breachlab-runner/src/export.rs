//! Export sink for alignment rows.
//!
//! A workbook is a directory; each sheet is one CSV file inside it, with a
//! JSON copy of the same rows alongside for machine consumers.

use anyhow::{Context, Result};
use breachlab_core::domain::AlignmentRow;
use std::path::{Path, PathBuf};

/// Sheet holding the aligned disclosure rows.
pub const SHEET_NAME: &str = "Disclosure Dates";

/// Column headers of the alignment sheet.
pub const COLUMNS: [&str; 6] = [
    "Name",
    "Disclosure Date",
    "Market Closed",
    "Reason",
    "Opening Price",
    "Closing Price",
];

/// Files written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub sheet_csv: PathBuf,
    pub rows_json: PathBuf,
}

/// Write `rows` as the alignment sheet of `{output_dir}/{workbook}`.
pub fn export_alignment(
    output_dir: impl AsRef<Path>,
    workbook: &str,
    rows: &[AlignmentRow],
) -> Result<ExportPaths> {
    let dir = output_dir.as_ref().join(workbook);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create workbook directory {}", dir.display()))?;

    let sheet_csv = dir.join(format!("{SHEET_NAME}.csv"));
    write_alignment_csv(&sheet_csv, rows)?;

    let rows_json = dir.join(format!("{SHEET_NAME}.json"));
    let json = serde_json::to_string_pretty(rows).context("serialize alignment rows")?;
    write_atomic(&rows_json, json.as_bytes())?;

    Ok(ExportPaths {
        sheet_csv,
        rows_json,
    })
}

/// Write the alignment sheet to a single CSV file.
pub fn write_alignment_csv(path: &Path, rows: &[AlignmentRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(sheet_record(row))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush CSV buffer: {e}"))?;
    write_atomic(path, &bytes)
}

fn sheet_record(row: &AlignmentRow) -> [String; 6] {
    [
        row.company_name.clone(),
        row.date.format("%Y-%m-%d").to_string(),
        if row.market_closed { "True" } else { "False" }.to_string(),
        row.reason.clone(),
        row.opening_price.to_string(),
        row.closing_price.to_string(),
    ]
}

/// Create the workbook directory and return the path of sheet `name`.
pub(crate) fn sheet_path(workbook_dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(workbook_dir)
        .with_context(|| format!("create workbook directory {}", workbook_dir.display()))?;
    Ok(workbook_dir.join(format!("{name}.csv")))
}

/// Write a header and string records as one CSV sheet.
pub(crate) fn write_sheet<R, F>(path: &Path, columns: &[&str], records: R) -> Result<()>
where
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for record in records {
        writer.write_record(&record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush CSV buffer: {e}"))?;
    write_atomic(path, &bytes)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sheet_uses_na_and_python_booleans() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            AlignmentRow::closure("Acme", d(2021, 5, 29), "Saturday"),
            AlignmentRow::reopen("Acme", d(2021, 6, 1)),
            AlignmentRow::priced("Beta", d(2021, 6, 2), 10.5, 11.25),
        ];

        let paths = export_alignment(dir.path(), "analysis_workbook", &rows).unwrap();
        assert_eq!(
            paths.sheet_csv,
            dir.path().join("analysis_workbook").join("Disclosure Dates.csv")
        );

        let text = std::fs::read_to_string(&paths.sheet_csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Name,Disclosure Date,Market Closed,Reason,Opening Price,Closing Price"
        );
        assert_eq!(lines[1], "Acme,2021-05-29,True,Saturday,N/A,N/A");
        assert_eq!(lines[2], "Acme,2021-06-01,False,Market reopen,N/A,N/A");
        assert_eq!(lines[3], "Beta,2021-06-02,False,,10.50,11.25");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn json_copy_matches_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![AlignmentRow::no_data("Acme", d(2021, 6, 2))];
        let paths = export_alignment(dir.path(), "wb", &rows).unwrap();

        let text = std::fs::read_to_string(&paths.rows_json).unwrap();
        let back: Vec<AlignmentRow> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn reexport_overwrites_previous_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let first = vec![AlignmentRow::no_data("Acme", d(2021, 6, 2)); 3];
        export_alignment(dir.path(), "wb", &first).unwrap();

        let second = vec![AlignmentRow::no_data("Acme", d(2021, 6, 3))];
        let paths = export_alignment(dir.path(), "wb", &second).unwrap();
        let text = std::fs::read_to_string(&paths.sheet_csv).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
