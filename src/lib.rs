//! # Chatstats
//!
//! A Rust library for computing descriptive statistics over personal
//! messaging exports: message/word/character counts, time-bucketed trends,
//! and rankings of conversation partners by activity.
//!
//! ## Overview
//!
//! Chatstats is the analysis core only. An ingestion layer (not part of
//! this crate) decodes an export into [`Conversation`] values — private
//! and group channels full of [`MessageRecord`]s — and hands them over;
//! everything after that is a pure function over immutable snapshots:
//!
//! - **Filtering**: an ordered, composable pipeline over channels,
//!   participants, sender subject, and calendar-resolved date ranges.
//! - **Aggregation**: eager per-record derived columns, lazy grouped time
//!   series, frequency tables, and partner rankings.
//! - **Bucketing**: calendar-aligned year/month/day/hour periods with
//!   correct boundary semantics.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatstats::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! fn main() -> chatstats::Result<()> {
//!     let ts = |d, h| Utc.with_ymd_and_hms(2014, 11, d, h, 0, 0).unwrap();
//!     let conversations = vec![Conversation::new(
//!         "Tőke Hal",
//!         ChannelKind::Private,
//!         ["Dénes Kiss", "Tőke Hal"],
//!         vec![
//!             MessageRecord::new("Dénes Kiss", "Tőke Hal", ts(2, 9)).with_text("szia"),
//!             MessageRecord::new("Tőke Hal", "Tőke Hal", ts(2, 10)).with_text("hali"),
//!         ],
//!     )];
//!
//!     let manager = MessagingAnalyzerManager::new(
//!         conversations,
//!         AnalyzerConfig::new("Dénes Kiss"),
//!     );
//!     let stats = manager.private().stats();
//!     assert_eq!(stats.mc(), 2);
//!
//!     let mine = stats.filter(&FilterQuery::new().with_subject(Subject::Me))?;
//!     assert_eq!(mine.mc(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`message`] — [`MessageRecord`], the immutable unit of data
//! - [`conversation`] — [`Conversation`] and [`ChannelKind`]
//! - [`config`] — [`AnalyzerConfig`]: account owner + platform epoch
//! - [`period`] — calendar bucketing ([`Period`](period::Period), [`PeriodKey`](period::PeriodKey))
//! - [`filter`] — the filter pipeline ([`FilterQuery`], [`Subject`])
//! - [`stats`] — the aggregation engine ([`ConversationStats`], rankings)
//! - [`analyzer`] — per-kind analyzers and the cross-kind manager
//! - [`pipeline`] — best-effort text normalization ahead of tokenization
//! - [`language`] — coarse per-message language guessing
//! - [`error`] — unified error types ([`ChatStatsError`], [`Result`])
//! - [`prelude`] — convenient re-exports

pub mod analyzer;
pub mod config;
pub mod conversation;
pub mod error;
pub mod filter;
pub mod language;
pub mod message;
pub mod period;
pub mod pipeline;
pub mod stats;

// Re-export the main types at the crate root for convenience
pub use analyzer::{MessagingAnalyzer, MessagingAnalyzerManager};
pub use config::AnalyzerConfig;
pub use conversation::{ChannelKind, Conversation};
pub use error::{ChatStatsError, Result};
pub use filter::{FilterQuery, Subject};
pub use message::MessageRecord;
pub use stats::ConversationStats;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatstats::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use crate::conversation::{ChannelKind, Conversation};
    pub use crate::message::{MediaKind, MessageRecord, Reaction};

    // Configuration
    pub use crate::config::AnalyzerConfig;

    // Error types
    pub use crate::error::{ChatStatsError, Result};

    // Filtering
    pub use crate::filter::{FilterQuery, Subject};

    // Periods
    pub use crate::period::{Period, PeriodKey};

    // Aggregation
    pub use crate::stats::{ConversationStats, RankBy, Ranking, Statistic};

    // Analyzers
    pub use crate::analyzer::{ChannelSizeStats, MessagingAnalyzer, MessagingAnalyzerManager};
}
