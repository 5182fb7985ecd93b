//! Property tests for the per-company disclosure summary.

use breachlab_core::domain::DisclosureRecord;
use breachlab_runner::summarize_disclosures;
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn arb_records() -> impl Strategy<Value = Vec<DisclosureRecord>> {
    prop::collection::vec((1i64..6, 0u64..1500), 0..60).prop_map(|pairs| {
        let base = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        pairs
            .into_iter()
            .map(|(id, offset)| {
                DisclosureRecord::on_date(id, format!("Co {id}"), format!("C{id}"), base + Days::new(offset))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn counts_add_up_to_input(records in arb_records()) {
        let summaries = summarize_disclosures(&records);
        let total: usize = summaries.iter().map(|s| s.disclosures).sum();
        prop_assert_eq!(total, records.len());
    }

    #[test]
    fn one_summary_per_company_in_id_order(records in arb_records()) {
        let summaries = summarize_disclosures(&records);
        let ids: Vec<i64> = summaries.iter().map(|s| s.company_id).collect();
        let mut expected: Vec<i64> = records.iter().map(|r| r.company_id).collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn most_recent_is_the_latest_date(records in arb_records()) {
        for s in summarize_disclosures(&records) {
            let latest = records
                .iter()
                .filter(|r| r.company_id == s.company_id)
                .map(|r| r.disclosure_date())
                .max()
                .unwrap();
            prop_assert_eq!(s.most_recent, latest);
        }
    }
}
