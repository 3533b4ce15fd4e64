//! Benchmarks for chatstats snapshot construction and aggregation.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench aggregation -- snapshot`

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chatstats::prelude::*;
use chatstats::stats::StatsContext;

use chrono::{Duration, TimeZone, Utc};

// =============================================================================
// Test Data Generators
// =============================================================================

const SENDERS: [&str; 4] = ["Me", "Anna", "Bori", "Cili"];
const TEXTS: [&str; 5] = [
    "hello there",
    "how are you doing today",
    "ok",
    "see you at eight then",
    "szia mi újság",
];

fn generate_records(count: usize) -> Vec<MessageRecord> {
    let base = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let ts = base + Duration::minutes(i as i64 * 17);
            let sender = SENDERS[i % SENDERS.len()];
            let channel = if i % 3 == 0 { "marathon" } else { "Tőke Hal" };
            let record = MessageRecord::new(sender, channel, ts);
            if i % 11 == 0 {
                record.with_media(MediaKind::Photo)
            } else {
                record.with_text(TEXTS[i % TEXTS.len()])
            }
        })
        .collect()
}

fn snapshot(count: usize) -> ConversationStats {
    let context = Arc::new(StatsContext::new(AnalyzerConfig::new("Me")));
    ConversationStats::new(generate_records(count), context)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_snapshot_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    for count in [100, 1_000, 10_000] {
        let records = generate_records(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            let context = Arc::new(StatsContext::new(AnalyzerConfig::new("Me")));
            b.iter(|| {
                black_box(ConversationStats::new(
                    records.clone(),
                    Arc::clone(&context),
                ))
            });
        });
    }
    group.finish();
}

fn bench_filtering(c: &mut Criterion) {
    let stats = snapshot(10_000);
    let query = FilterQuery::new()
        .with_subject(Subject::Partner)
        .with_start(Utc.with_ymd_and_hms(2014, 3, 1, 0, 0, 0).unwrap())
        .with_end(Utc.with_ymd_and_hms(2014, 9, 1, 0, 0, 0).unwrap());

    c.bench_function("filter_subject_and_range", |b| {
        b.iter(|| black_box(stats.filter(&query).unwrap()));
    });
}

fn bench_grouped_series(c: &mut Criterion) {
    let stats = snapshot(10_000);
    let mut group = c.benchmark_group("grouped_series");
    for (name, period) in [("month", Period::Month), ("day", Period::Day), ("hour", Period::Hour)] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(stats.grouped_time_series(period)));
        });
    }
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let stats = snapshot(10_000);
    c.bench_function("ranking_contributors", |b| {
        b.iter(|| {
            black_box(
                stats
                    .ranking_of_partners(Statistic::MessageCount, RankBy::Contributor, None)
                    .unwrap(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_snapshot_construction,
    bench_filtering,
    bench_grouped_series,
    bench_ranking
);
criterion_main!(benches);
