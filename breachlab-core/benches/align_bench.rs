//! Criterion benchmarks for the alignment hot path.
//!
//! Benchmarks:
//! 1. Calendar next-open search across a year of start dates
//! 2. Sequential vs parallel alignment of a disclosure batch

use breachlab_core::align::{DisclosureAligner, PriceIndex};
use breachlab_core::calendar::MarketCalendar;
use breachlab_core::domain::{DisclosureRecord, PriceRecord};
use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ── Helpers ──────────────────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn make_prices(companies: i64, days: u64) -> PriceIndex {
    let rows = (1..=companies).flat_map(|company_id| {
        (0..days).map(move |i| {
            let close = 50.0 + (i as f64 * 0.1).sin() * 5.0;
            PriceRecord {
                company_id,
                date: base_date() + Days::new(i),
                open: close - 0.2,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adj_close: close,
                volume: 10_000 + i,
            }
        })
    });
    PriceIndex::from_records(rows)
}

fn make_disclosures(n: usize, companies: i64, days: u64) -> Vec<DisclosureRecord> {
    (0..n)
        .map(|i| {
            let company_id = 1 + (i as i64 % companies);
            DisclosureRecord::on_date(
                company_id,
                format!("Company {company_id}"),
                format!("C{company_id}"),
                base_date() + Days::new((i as u64 * 7) % days),
            )
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_next_open(c: &mut Criterion) {
    let cal = MarketCalendar::default();
    c.bench_function("next_open_date_year", |b| {
        b.iter(|| {
            for i in 0..365 {
                black_box(cal.next_open_date(base_date() + Days::new(i)).unwrap());
            }
        })
    });
}

fn bench_align(c: &mut Criterion) {
    let cal = MarketCalendar::default();
    let prices = make_prices(50, 730);
    let aligner = DisclosureAligner::new(&cal, &prices);

    let mut group = c.benchmark_group("align_all");
    for n in [100usize, 1_000, 10_000] {
        let records = make_disclosures(n, 50, 730);
        group.bench_with_input(BenchmarkId::new("sequential", n), &records, |b, recs| {
            b.iter(|| black_box(aligner.align_all(recs).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &records, |b, recs| {
            b.iter(|| black_box(aligner.align_all_parallel(recs).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_next_open, bench_align);
criterion_main!(benches);
