//! Duplicate-row check over the stored stock data.

use crate::analysis::RunError;
use breachlab_core::data::{find_duplicates, remove_duplicates, CsvStore, DuplicateGroup};
use tracing::{info, warn};

/// What a duplicate check found and removed.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateReport {
    pub rows_checked: usize,
    pub groups: Vec<DuplicateGroup>,
    pub rows_removed: usize,
}

impl DuplicateReport {
    pub fn is_clean(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Find fully identical stock-data rows and rewrite the table keeping one
/// copy of each. The table is left untouched when it is already clean.
pub fn run_duplicate_check(store: &CsvStore) -> Result<DuplicateReport, RunError> {
    let records = store.stock_data()?;
    let rows_checked = records.len();
    let groups = find_duplicates(&records);

    if groups.is_empty() {
        info!(rows = rows_checked, "no duplicate stock rows");
        return Ok(DuplicateReport {
            rows_checked,
            groups,
            rows_removed: 0,
        });
    }

    for group in &groups {
        warn!(
            company_id = group.record.company_id,
            date = %group.record.date,
            count = group.count,
            "duplicate stock row"
        );
    }
    let (kept, rows_removed) = remove_duplicates(records);
    store.write_stock_data(&kept)?;
    info!(removed = rows_removed, kept = kept.len(), "removed duplicate stock rows");

    Ok(DuplicateReport {
        rows_checked,
        groups,
        rows_removed,
    })
}
