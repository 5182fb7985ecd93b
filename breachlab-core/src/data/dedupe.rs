//! Duplicate detection for the stock-data table.
//!
//! Two rows are duplicates when every column matches. Alignment expects at
//! most one row per (company, date); this pass keeps that true upstream.

use crate::domain::PriceRecord;
use std::collections::HashMap;

/// A row that occurs more than once, with its occurrence count.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub record: PriceRecord,
    pub count: usize,
}

type RowKey = (i64, chrono::NaiveDate, [u64; 5], u64);

fn row_key(r: &PriceRecord) -> RowKey {
    (
        r.company_id,
        r.date,
        [
            r.open.to_bits(),
            r.high.to_bits(),
            r.low.to_bits(),
            r.close.to_bits(),
            r.adj_close.to_bits(),
        ],
        r.volume,
    )
}

/// Rows occurring more than once, ordered by first appearance.
pub fn find_duplicates(records: &[PriceRecord]) -> Vec<DuplicateGroup> {
    let mut counts: HashMap<RowKey, usize> = HashMap::new();
    let mut order: Vec<&PriceRecord> = Vec::new();
    for rec in records {
        let count = counts.entry(row_key(rec)).or_insert(0);
        if *count == 0 {
            order.push(rec);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|rec| {
            let count = counts[&row_key(rec)];
            (count > 1).then(|| DuplicateGroup {
                record: rec.clone(),
                count,
            })
        })
        .collect()
}

/// Drop repeated rows, keeping the first occurrence of each.
///
/// Returns the surviving rows in original order and the number removed.
pub fn remove_duplicates(records: Vec<PriceRecord>) -> (Vec<PriceRecord>, usize) {
    let before = records.len();
    let mut seen = std::collections::HashSet::new();
    let kept: Vec<PriceRecord> = records
        .into_iter()
        .filter(|r| seen.insert(row_key(r)))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(company_id: i64, day: u32, close: f64) -> PriceRecord {
        PriceRecord {
            company_id,
            date: NaiveDate::from_ymd_opt(2021, 6, day).unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close,
            adj_close: close,
            volume: 500,
        }
    }

    #[test]
    fn finds_exact_duplicates_only() {
        let rows = vec![
            rec(1, 1, 11.0),
            rec(1, 1, 11.0),
            rec(1, 1, 11.5), // same key, different close: not a duplicate
            rec(2, 1, 11.0),
            rec(1, 1, 11.0),
        ];
        let groups = find_duplicates(&rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].record, rec(1, 1, 11.0));
    }

    #[test]
    fn removal_keeps_first_occurrence_in_order() {
        let rows = vec![rec(2, 2, 1.0), rec(1, 1, 2.0), rec(2, 2, 1.0), rec(1, 3, 3.0)];
        let (kept, removed) = remove_duplicates(rows);
        assert_eq!(removed, 1);
        assert_eq!(kept, vec![rec(2, 2, 1.0), rec(1, 1, 2.0), rec(1, 3, 3.0)]);
    }

    #[test]
    fn clean_table_has_no_groups() {
        let rows = vec![rec(1, 1, 1.0), rec(1, 2, 1.0)];
        assert!(find_duplicates(&rows).is_empty());
        assert_eq!(remove_duplicates(rows).1, 0);
    }
}
