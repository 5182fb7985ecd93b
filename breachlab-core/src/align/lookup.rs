//! Point lookups of price records by (company, date).

use crate::domain::{CalendarDate, CompanyId, PriceRecord};
use std::collections::HashMap;
use tracing::warn;

/// Read-only price source queried by exact (company, date).
///
/// Implementations return at most one record per key. An unreachable
/// source behaves like an empty one: every lookup misses.
pub trait PriceLookup {
    fn price_on(&self, company_id: CompanyId, date: CalendarDate) -> Option<&PriceRecord>;
}

/// In-memory price index built from a materialized stock-data table.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    by_key: HashMap<(CompanyId, CalendarDate), PriceRecord>,
    duplicates: usize,
}

impl PriceIndex {
    /// Index `records`. The first record per key wins; later ones are
    /// counted as duplicates and dropped.
    pub fn from_records(records: impl IntoIterator<Item = PriceRecord>) -> Self {
        let mut by_key = HashMap::new();
        let mut duplicates = 0;
        for rec in records {
            let key = rec.key();
            if by_key.contains_key(&key) {
                duplicates += 1;
                continue;
            }
            by_key.insert(key, rec);
        }
        if duplicates > 0 {
            warn!(
                duplicates,
                "price index dropped duplicate (company, date) rows; run the duplicate check"
            );
        }
        Self { by_key, duplicates }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Rows dropped because their key was already indexed.
    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}

impl PriceLookup for PriceIndex {
    fn price_on(&self, company_id: CompanyId, date: CalendarDate) -> Option<&PriceRecord> {
        self.by_key.get(&(company_id, date))
    }
}

impl<T: PriceLookup + ?Sized> PriceLookup for &T {
    fn price_on(&self, company_id: CompanyId, date: CalendarDate) -> Option<&PriceRecord> {
        (**self).price_on(company_id, date)
    }
}
