//! Property-based tests for chatstats.
//!
//! These tests generate random record collections to find edge cases in
//! filtering, bucketing, and ranking.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use chatstats::prelude::*;
use chatstats::stats::StatsContext;

const OWNER: &str = "Me";

/// Generate a random record using fast strategies (no regex!)
fn arb_record() -> impl Strategy<Value = MessageRecord> {
    (
        // Fast: select from predefined senders
        prop::sample::select(vec![
            OWNER.to_string(),
            "Anna".to_string(),
            "Bori".to_string(),
            "Cili".to_string(),
            "Tőke Hal".to_string(),
        ]),
        // Fast: select from predefined channels
        prop::sample::select(vec![
            "alpha".to_string(),
            "beta".to_string(),
            "gamma".to_string(),
        ]),
        // Fast: select from predefined contents
        prop::sample::select(vec![
            Some("hello".to_string()),
            Some("how are you".to_string()),
            Some("szia mi újság".to_string()),
            Some("ok".to_string()),
            Some("🎉🔥 emoji".to_string()),
            Some(String::new()),
            None,
        ]),
        // Timestamps inside 2014 at hour granularity
        (1u32..=12, 1u32..=28, 0u32..=23),
        prop::bool::ANY,
    )
        .prop_map(|(sender, channel, text, (m, d, h), media)| {
            let ts = Utc.with_ymd_and_hms(2014, m, d, h, 0, 0).unwrap();
            let mut record = MessageRecord::new(sender, channel, ts);
            if let Some(text) = text {
                record = record.with_text(text);
            }
            if media {
                record = record.with_media(MediaKind::Photo);
            }
            record
        })
}

fn arb_records(max_len: usize) -> impl Strategy<Value = Vec<MessageRecord>> {
    prop::collection::vec(arb_record(), 0..max_len)
}

fn arb_query() -> impl Strategy<Value = FilterQuery> {
    prop_oneof![
        Just(FilterQuery::new().with_subject(Subject::Me)),
        Just(FilterQuery::new().with_subject(Subject::Partner)),
        Just(FilterQuery::new().with_subject(Subject::Person("Anna".to_string()))),
        Just(FilterQuery::new().with_channels(["alpha"])),
        Just(FilterQuery::new().with_channels(["alpha", "gamma"])),
        Just(
            FilterQuery::new()
                .with_start(Utc.with_ymd_and_hms(2014, 3, 1, 0, 0, 0).unwrap())
                .with_end(Utc.with_ymd_and_hms(2014, 9, 30, 23, 59, 59).unwrap())
        ),
    ]
}

fn snapshot(records: Vec<MessageRecord>) -> ConversationStats {
    let context = Arc::new(StatsContext::new(AnalyzerConfig::new(OWNER)));
    ConversationStats::new(records, context)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================
    // FILTER PROPERTIES
    // ============================================

    /// Applying the same single-dimension filter twice changes nothing.
    #[test]
    fn filter_is_idempotent(records in arb_records(30), query in arb_query()) {
        let stats = snapshot(records);
        let once = stats.filter(&query).unwrap();
        let twice = once.filter(&query).unwrap();
        prop_assert_eq!(once.mc(), twice.mc());
        prop_assert_eq!(once.wc(), twice.wc());
        prop_assert_eq!(once.cc(), twice.cc());
        prop_assert_eq!(once.messages(), twice.messages());
    }

    /// Filtering never increases any scalar aggregate.
    #[test]
    fn filter_never_increases_counts(records in arb_records(30), query in arb_query()) {
        let stats = snapshot(records);
        let filtered = stats.filter(&query).unwrap();
        prop_assert!(filtered.mc() <= stats.mc());
        prop_assert!(filtered.wc() <= stats.wc());
        prop_assert!(filtered.media_mc() <= stats.media_mc());
    }

    /// Me and Partner partition the collection.
    #[test]
    fn me_and_partner_partition(records in arb_records(30)) {
        let stats = snapshot(records);
        let me = stats.filter(&FilterQuery::new().with_subject(Subject::Me)).unwrap();
        let partner = stats.filter(&FilterQuery::new().with_subject(Subject::Partner)).unwrap();
        prop_assert_eq!(me.mc() + partner.mc(), stats.mc());
        prop_assert_eq!(me.wc() + partner.wc(), stats.wc());
    }

    /// Filter output preserves the input's timestamp ordering.
    #[test]
    fn filter_preserves_order(records in arb_records(30), query in arb_query()) {
        let mut sorted = records;
        sorted.sort_by_key(|r| r.timestamp());
        let stats = snapshot(sorted);
        let filtered = stats.filter(&query).unwrap();
        let timestamps: Vec<_> = filtered.messages().iter().map(|r| r.timestamp()).collect();
        let mut resorted = timestamps.clone();
        resorted.sort();
        prop_assert_eq!(timestamps, resorted);
    }

    // ============================================
    // PERIOD PROPERTIES
    // ============================================

    /// Hour-of-day coverage is always exactly 24 labels, data or not.
    #[test]
    fn hourly_coverage_is_complete(records in arb_records(30)) {
        let stats = snapshot(records);
        let per_hour = stats.stat_per_period(Period::Hour, Statistic::MessageCount);
        prop_assert_eq!(per_hour.len(), 24);
        let total: u64 = per_hour.iter().map(|(_, v)| v).sum();
        prop_assert_eq!(total, stats.mc());
    }

    /// Grouped buckets cover every record exactly once.
    #[test]
    fn grouped_series_conserves_totals(records in arb_records(30)) {
        let stats = snapshot(records);
        for period in [Period::Year, Period::Month, Period::Day, Period::Hour] {
            let rows = stats.grouped_time_series(period);
            let mc: u64 = rows.iter().map(|r| r.mc).sum();
            let wc: u64 = rows.iter().map(|r| r.wc).sum();
            prop_assert_eq!(mc, stats.mc());
            prop_assert_eq!(wc, stats.wc());
        }
    }

    // ============================================
    // RANKING PROPERTIES
    // ============================================

    /// An untruncated ranking's percentages sum to 100 (when any count
    /// is nonzero).
    #[test]
    fn ranking_percentages_sum_to_100(records in arb_records(40)) {
        let stats = snapshot(records);
        match stats.ranking_of_partners(Statistic::MessageCount, RankBy::Contributor, None) {
            Ok(ranking) => {
                let total_count: u64 = ranking.count.iter().map(|(_, c)| c).sum();
                let total_percent: f64 = ranking.percent.iter().map(|(_, p)| p).sum();
                if total_count > 0 {
                    prop_assert!((total_percent - 100.0).abs() < 1e-6);
                }
                // Descending order.
                for pair in ranking.count.windows(2) {
                    prop_assert!(pair[0].1 >= pair[1].1);
                }
            }
            Err(ChatStatsError::InsufficientPopulation { found }) => {
                prop_assert!(found < 2);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    // ============================================
    // ADDITIVITY
    // ============================================

    /// Private and group analyzers over disjoint sets add up to the
    /// combined snapshot for any sender.
    #[test]
    fn private_plus_group_equals_combined(
        private in arb_records(20),
        group in arb_records(20),
    ) {
        let private_convo = Conversation::new(
            "private-side", ChannelKind::Private, [OWNER, "Anna"],
            private.into_iter().map(|mut r| { r.channel = "private-side".to_string(); r }).collect(),
        );
        let group_convo = Conversation::new(
            "group-side", ChannelKind::Group, [OWNER, "Anna", "Bori"],
            group.into_iter().map(|mut r| { r.channel = "group-side".to_string(); r }).collect(),
        );
        let manager = MessagingAnalyzerManager::new(
            vec![private_convo, group_convo],
            AnalyzerConfig::new(OWNER),
        );

        let query = FilterQuery::new().with_subject(Subject::Person("Anna".to_string()));
        let private_mc = manager.private().stats().filter(&query).unwrap().mc();
        let group_mc = manager.group().stats().filter(&query).unwrap().mc();
        let combined_mc = manager.combined_stats().filter(&query).unwrap().mc();
        prop_assert_eq!(private_mc + group_mc, combined_mc);
    }
}
