//! The aggregation and ranking engine.
//!
//! [`ConversationStats`] is an immutable snapshot over one record
//! collection. Per-record derived columns (message/text/media flags, word,
//! unique-word, and character counts) are computed eagerly at construction;
//! cross-cutting views (frequency tables, grouped time series, rankings,
//! the language map) are computed on demand from those columns.
//!
//! Snapshots are cheap, short-lived values: [`filter`](ConversationStats::filter)
//! returns a *new* snapshot over the reduced collection and never touches
//! `self`. A filter that matches nothing yields a valid zero-valued
//! snapshot that can be filtered further.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use chatstats::config::AnalyzerConfig;
//! use chatstats::filter::{FilterQuery, Subject};
//! use chatstats::message::MessageRecord;
//! use chatstats::stats::{ConversationStats, StatsContext};
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> chatstats::Result<()> {
//! let ts = Utc.with_ymd_and_hms(2014, 11, 2, 9, 0, 0).unwrap();
//! let records = vec![
//!     MessageRecord::new("Me", "chat", ts).with_text("hello hello world"),
//!     MessageRecord::new("Anna", "chat", ts).with_text("hi"),
//! ];
//! let ctx = Arc::new(StatsContext::new(AnalyzerConfig::new("Me")));
//! let stats = ConversationStats::new(records, ctx);
//!
//! assert_eq!(stats.mc(), 2);
//! assert_eq!(stats.wc(), 4);
//! assert_eq!(stats.unique_wc(), 3);
//! assert_eq!(stats.filter(&FilterQuery::new().with_subject(Subject::Me))?.mc(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::error::{ChatStatsError, Result};
use crate::filter::{FilterContext, FilterQuery};
use crate::language::{LanguageGuess, guess_language};
use crate::message::MessageRecord;
use crate::period::{Period, PeriodKey};
use crate::pipeline::TextPipeline;

/// The derived columns computed once per record at snapshot construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetrics {
    /// Whether the record counts as a text message.
    pub is_text: bool,
    /// Whether the record carries a media attachment.
    pub is_media: bool,
    /// Token count of the normalized text.
    pub wc: u64,
    /// Distinct-token count of the normalized text.
    pub unique_wc: u64,
    /// Character count summed over tokens (whitespace not counted).
    pub cc: u64,
}

/// A named per-record statistic that grouped views can sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// Message count (1 per record).
    MessageCount,
    /// Text-message count.
    TextMessageCount,
    /// Media-message count.
    MediaMessageCount,
    /// Word count.
    WordCount,
    /// Character count.
    CharCount,
}

impl Statistic {
    fn value_of(self, metrics: &RecordMetrics) -> u64 {
        match self {
            Statistic::MessageCount => 1,
            Statistic::TextMessageCount => u64::from(metrics.is_text),
            Statistic::MediaMessageCount => u64::from(metrics.is_media),
            Statistic::WordCount => metrics.wc,
            Statistic::CharCount => metrics.cc,
        }
    }
}

impl FromStr for Statistic {
    type Err = ChatStatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mc" => Ok(Statistic::MessageCount),
            "text_mc" => Ok(Statistic::TextMessageCount),
            "media_mc" => Ok(Statistic::MediaMessageCount),
            "wc" => Ok(Statistic::WordCount),
            "cc" => Ok(Statistic::CharCount),
            _ => Err(ChatStatsError::unknown_statistic(s)),
        }
    }
}

/// One bucket of a grouped time series: the bucket's start timestamp and
/// every derived column summed over the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    /// Start of the bucket (day 1 / hour 0 as applicable).
    pub timestamp: DateTime<Utc>,
    /// Messages in the bucket.
    pub mc: u64,
    /// Text messages in the bucket.
    pub text_mc: u64,
    /// Media messages in the bucket.
    pub media_mc: u64,
    /// Words in the bucket.
    pub wc: u64,
    /// Per-record distinct words, summed.
    pub unique_wc: u64,
    /// Characters in the bucket.
    pub cc: u64,
}

/// What entity a ranking groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    /// Rank senders, excluding the account owner. The default for
    /// private conversations.
    Contributor,
    /// Rank channels. The default for group conversations.
    Channel,
}

/// A descending ranking of partners (or channels) by a statistic.
///
/// `percent` values are computed over the untruncated population, so each
/// entry retains its population-wide share; a truncated ranking therefore
/// no longer sums to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Entity → summed statistic, descending, ties by first-seen order.
    pub count: Vec<(String, u64)>,
    /// Entity → population-wide percentage, same order as `count`.
    pub percent: Vec<(String, f64)>,
}

impl Ranking {
    /// Returns the ranked count for one entity, if present.
    pub fn count_of(&self, entity: &str) -> Option<u64> {
        self.count
            .iter()
            .find(|(name, _)| name == entity)
            .map(|(_, c)| *c)
    }

    /// Number of ranked entities.
    pub fn len(&self) -> usize {
        self.count.len()
    }

    /// Returns `true` if no entities are ranked.
    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }
}

/// Ambient context shared by a snapshot and everything filtered from it:
/// the analyzer configuration and each channel's participant set.
#[derive(Debug, Clone)]
pub struct StatsContext {
    /// Owner identity and platform epoch.
    pub config: AnalyzerConfig,
    /// Participant sets keyed by channel identifier; feeds the
    /// participant filter and group-membership queries.
    pub participants_by_channel: HashMap<String, BTreeSet<String>>,
}

impl StatsContext {
    /// Creates a context with an empty participant index.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            participants_by_channel: HashMap::new(),
        }
    }

    /// Creates a context with a participant index.
    pub fn with_participants(
        config: AnalyzerConfig,
        participants_by_channel: HashMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            config,
            participants_by_channel,
        }
    }
}

/// An immutable statistics snapshot over one record collection.
#[derive(Debug, Clone)]
pub struct ConversationStats {
    records: Arc<Vec<MessageRecord>>,
    metrics: Vec<RecordMetrics>,
    tokens: Vec<Vec<String>>,
    context: Arc<StatsContext>,
}

impl ConversationStats {
    /// Builds a snapshot, computing every per-record derived column.
    pub fn new(records: Vec<MessageRecord>, context: Arc<StatsContext>) -> Self {
        let pipeline = TextPipeline::standard();
        let tokens: Vec<Vec<String>> = records
            .iter()
            .map(|r| r.text().map_or_else(Vec::new, |t| pipeline.tokenize(t)))
            .collect();
        let metrics = records
            .iter()
            .zip(&tokens)
            .map(|(record, toks)| RecordMetrics {
                is_text: record.is_text(),
                is_media: record.is_media(),
                wc: toks.len() as u64,
                unique_wc: toks.iter().collect::<HashSet<_>>().len() as u64,
                cc: toks.iter().map(|t| t.chars().count() as u64).sum(),
            })
            .collect();
        Self {
            records: Arc::new(records),
            metrics,
            tokens,
            context,
        }
    }

    // =========================================================================
    // Scalar aggregates
    // =========================================================================

    /// Total message count.
    pub fn mc(&self) -> u64 {
        self.records.len() as u64
    }

    /// Count of records classified as text messages.
    pub fn text_mc(&self) -> u64 {
        self.metrics.iter().filter(|m| m.is_text).count() as u64
    }

    /// Count of records carrying a media attachment.
    pub fn media_mc(&self) -> u64 {
        self.metrics.iter().filter(|m| m.is_media).count() as u64
    }

    /// Total word count (whitespace-tokenized, case-folded).
    pub fn wc(&self) -> u64 {
        self.metrics.iter().map(|m| m.wc).sum()
    }

    /// Total character count (token lengths summed; whitespace excluded).
    pub fn cc(&self) -> u64 {
        self.metrics.iter().map(|m| m.cc).sum()
    }

    /// Count of distinct text contents among text messages.
    pub fn unique_mc(&self) -> u64 {
        self.records
            .iter()
            .zip(&self.metrics)
            .filter(|(_, m)| m.is_text)
            .filter_map(|(r, _)| r.text())
            .map(str::trim)
            .collect::<HashSet<_>>()
            .len() as u64
    }

    /// Count of distinct normalized words across the snapshot.
    pub fn unique_wc(&self) -> u64 {
        self.tokens
            .iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len() as u64
    }

    /// Mean token length in characters; 0 for a wordless snapshot.
    pub fn average_word_length(&self) -> f64 {
        let wc = self.wc();
        if wc == 0 {
            return 0.0;
        }
        self.cc() as f64 / wc as f64
    }

    /// Share of media messages, in percent; 0 for an empty snapshot.
    pub fn percentage_of_media_messages(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.media_mc() as f64 / self.mc() as f64 * 100.0
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// The records of this snapshot, in timestamp order.
    pub fn messages(&self) -> &[MessageRecord] {
        &self.records
    }

    /// Every normalized token, in record order.
    pub fn words(&self) -> Vec<String> {
        self.tokens.iter().flatten().cloned().collect()
    }

    /// Distinct channel identifiers, in first-seen order.
    pub fn channels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.channel()))
            .map(|r| r.channel().to_string())
            .collect()
    }

    /// Distinct senders present in this snapshot, in first-seen order.
    pub fn contributors(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.sender()))
            .map(|r| r.sender().to_string())
            .collect()
    }

    /// Records carrying at least one reaction.
    pub fn reacted_messages(&self) -> Vec<&MessageRecord> {
        self.records.iter().filter(|r| r.has_reactions()).collect()
    }

    /// Message texts by frequency, descending, ties by first-seen order.
    pub fn most_used_messages(&self) -> Vec<(String, u64)> {
        frequency_table(
            self.records
                .iter()
                .filter(|r| r.is_text())
                .filter_map(|r| r.text())
                .map(|t| t.trim().to_string()),
        )
    }

    /// Normalized words by frequency, descending, ties by first-seen order.
    pub fn most_used_words(&self) -> Vec<(String, u64)> {
        frequency_table(self.tokens.iter().flatten().cloned())
    }

    /// A best-guess language tag per unique message text.
    ///
    /// Heuristic only; consult the `reliable` flag before trusting a tag.
    pub fn message_language_map(&self) -> HashMap<String, LanguageGuess> {
        let mut map = HashMap::new();
        for (record, toks) in self.records.iter().zip(&self.tokens) {
            if let Some(text) = record.text() {
                if record.is_text() {
                    map.entry(text.trim().to_string())
                        .or_insert_with(|| guess_language(toks));
                }
            }
        }
        map
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Applies a filter query and returns a new snapshot over the reduced
    /// collection. `self` is never mutated.
    pub fn filter(&self, query: &FilterQuery) -> Result<ConversationStats> {
        let ctx = FilterContext {
            owner: self.context.config.owner(),
            platform_epoch: self.context.config.platform_epoch,
            participants_by_channel: &self.context.participants_by_channel,
        };
        let kept = query.apply(&self.records, &ctx)?;
        Ok(ConversationStats::new(kept, Arc::clone(&self.context)))
    }

    /// True iff this snapshot's single channel was created (first messaged)
    /// by the account owner.
    ///
    /// The question is only defined over exactly one channel; a wider or
    /// empty snapshot returns [`ChatStatsError::AmbiguousScope`].
    pub fn created_by_me(&self) -> Result<bool> {
        let channels = self.channels();
        if channels.len() != 1 {
            return Err(ChatStatsError::AmbiguousScope {
                channels: channels.len(),
            });
        }
        let earliest = self
            .records
            .iter()
            .min_by_key(|r| r.timestamp())
            .expect("single-channel snapshot has at least one record");
        Ok(self.context.config.is_owner(earliest.sender()))
    }

    // =========================================================================
    // Time-bucketed views
    // =========================================================================

    /// Groups every derived column by calendar bucket and sums per bucket.
    ///
    /// Rows are sorted chronologically, one per *observed* bucket; buckets
    /// with zero activity are not synthesized here.
    pub fn grouped_time_series(&self, period: Period) -> Vec<PeriodRow> {
        let mut buckets: BTreeMap<PeriodKey, PeriodRow> = BTreeMap::new();
        for (record, metrics) in self.records.iter().zip(&self.metrics) {
            let key = period.key_of(record.timestamp());
            let row = buckets.entry(key).or_insert_with(|| PeriodRow {
                timestamp: key.start(),
                mc: 0,
                text_mc: 0,
                media_mc: 0,
                wc: 0,
                unique_wc: 0,
                cc: 0,
            });
            row.mc += 1;
            row.text_mc += u64::from(metrics.is_text);
            row.media_mc += u64::from(metrics.is_media);
            row.wc += metrics.wc;
            row.unique_wc += metrics.unique_wc;
            row.cc += metrics.cc;
        }
        buckets.into_values().collect()
    }

    /// Sums one statistic per period label, pre-filled with the full label
    /// domain at zero.
    ///
    /// Months, weekdays, and hours always yield their complete inventories
    /// (12 / 7 / 24 labels) so empty buckets are explicit zeros. Years have
    /// no finite inventory; the domain is the contiguous observed year
    /// range, and an empty snapshot yields an empty map.
    pub fn stat_per_period(&self, period: Period, statistic: Statistic) -> Vec<(String, u64)> {
        let labels = match period {
            Period::Year => self.observed_year_labels(),
            _ => period.labels(),
        };
        let mut totals: HashMap<String, u64> =
            labels.iter().map(|l| (l.clone(), 0)).collect();

        for (record, metrics) in self.records.iter().zip(&self.metrics) {
            let label = period.label_of(record.timestamp());
            if let Some(total) = totals.get_mut(&label) {
                *total += statistic.value_of(metrics);
            }
        }

        labels
            .into_iter()
            .map(|label| {
                let total = totals[&label];
                (label, total)
            })
            .collect()
    }

    fn observed_year_labels(&self) -> Vec<String> {
        let years: Vec<i32> = self.records.iter().map(|r| r.timestamp().year()).collect();
        match (years.iter().min(), years.iter().max()) {
            (Some(&lo), Some(&hi)) => (lo..=hi).map(|y| y.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    // =========================================================================
    // Rankings
    // =========================================================================

    /// Ranks conversation partners (or channels) by a summed statistic.
    ///
    /// `Contributor` ranks senders excluding the account owner; `Channel`
    /// ranks channel identifiers. Fewer than two rankable entities is a
    /// population error — ranking one person is meaningless, not zero. A
    /// ranking where every count is zero (nobody matched the statistic) is
    /// a legitimate outcome with all-zero percentages.
    ///
    /// `top` truncates to the N highest entries while preserving each
    /// entry's population-wide percentage.
    pub fn ranking_of_partners(
        &self,
        statistic: Statistic,
        rank_by: RankBy,
        top: Option<usize>,
    ) -> Result<Ranking> {
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, u64> = HashMap::new();

        for (record, metrics) in self.records.iter().zip(&self.metrics) {
            let entity = match rank_by {
                RankBy::Contributor => {
                    if self.context.config.is_owner(record.sender()) {
                        continue;
                    }
                    record.sender()
                }
                RankBy::Channel => record.channel(),
            };
            if !totals.contains_key(entity) {
                order.push(entity.to_string());
            }
            *totals.entry(entity.to_string()).or_insert(0) += statistic.value_of(metrics);
        }

        if order.len() < 2 {
            return Err(ChatStatsError::InsufficientPopulation { found: order.len() });
        }

        // Stable sort keeps first-seen order among ties.
        let mut count: Vec<(String, u64)> = order
            .into_iter()
            .map(|entity| {
                let total = totals[&entity];
                (entity, total)
            })
            .collect();
        count.sort_by(|a, b| b.1.cmp(&a.1));

        let population: u64 = count.iter().map(|(_, c)| c).sum();
        let percent: Vec<(String, f64)> = count
            .iter()
            .map(|(entity, c)| {
                let share = if population == 0 {
                    0.0
                } else {
                    *c as f64 / population as f64 * 100.0
                };
                (entity.clone(), share)
            })
            .collect();

        let mut ranking = Ranking { count, percent };
        if let Some(n) = top {
            ranking.count.truncate(n);
            ranking.percent.truncate(n);
        }
        Ok(ranking)
    }
}

/// Counts occurrences, descending, ties broken by first appearance.
fn frequency_table(items: impl Iterator<Item = String>) -> Vec<(String, u64)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for item in items {
        if !counts.contains_key(&item) {
            order.push(item.clone());
        }
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut table: Vec<(String, u64)> = order
        .into_iter()
        .map(|item| {
            let count = counts[&item];
            (item, count)
        })
        .collect();
    table.sort_by(|a, b| b.1.cmp(&a.1));
    table
}
