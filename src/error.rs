//! Unified error types for chatstats.
//!
//! This module provides a single [`ChatStatsError`] enum that covers all
//! error cases in the library. Every public entry point that validates its
//! arguments returns one of these variants instead of panicking.
//!
//! # Error Handling Philosophy
//!
//! - **Validation errors** are rejected at the boundary: unknown period,
//!   subject, or statistic tokens, and incomplete date filters.
//! - **Population errors** signal that an operation is meaningless on the
//!   data, distinctly from an empty (and legitimate) zero-count result.
//! - **Empty results are never errors**: a filter that matches nothing
//!   returns a valid, zero-valued snapshot.

use thiserror::Error;

/// A specialized [`Result`] type for chatstats operations.
///
/// # Example
///
/// ```rust
/// use chatstats::error::Result;
///
/// fn my_query() -> Result<u64> {
///     Ok(0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatStatsError>;

/// The error type for all chatstats operations.
///
/// Each variant carries the offending input so callers can surface
/// actionable messages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatStatsError {
    /// An unrecognized period token was supplied.
    ///
    /// Accepted tokens: `y`/`year`, `m`/`month`, `d`/`day`, `h`/`hour`.
    #[error("Unknown period '{input}'. Expected one of: y, m, d, h")]
    UnknownPeriod {
        /// The token that failed to parse.
        input: String,
    },

    /// An unrecognized subject token was supplied.
    ///
    /// Accepted: `all`, `me`, `partner`, or a non-blank sender name.
    #[error("Unknown subject '{input}'. Expected: all, me, partner, or a sender name")]
    UnknownSubject {
        /// The token that failed to parse.
        input: String,
    },

    /// An unrecognized statistic name was supplied.
    ///
    /// Accepted: `mc`, `text_mc`, `media_mc`, `wc`, `cc`.
    #[error("Unknown statistic '{input}'. Expected one of: mc, text_mc, media_mc, wc, cc")]
    UnknownStatistic {
        /// The token that failed to parse.
        input: String,
    },

    /// Invalid date string in a filter.
    ///
    /// Date filters expect YYYY-MM-DD format.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided.
        input: String,
        /// Expected format description.
        expected: &'static str,
    },

    /// A date filter was requested with too few bounds to resolve a range.
    ///
    /// A range needs two of {start, end, period}; a lone period defaults
    /// its bounds to the platform epoch and now.
    #[error("Incomplete date filter: only '{supplied}' given; a range needs two of start/end/period")]
    IncompleteDateFilter {
        /// Which single bound was supplied.
        supplied: &'static str,
    },

    /// Ranking was attempted over fewer than two entities.
    ///
    /// Ranking a single person (or channel) is meaningless. This is
    /// distinct from a ranking over zero matching records, which is a
    /// legitimate zero-count outcome.
    #[error("Cannot rank {found} entit{}; at least 2 are required", if *found == 1 { "y" } else { "ies" })]
    InsufficientPopulation {
        /// How many rankable entities the snapshot contained.
        found: usize,
    },

    /// A single-channel operation was invoked on a multi-channel snapshot.
    ///
    /// `created_by_me` is only defined when the snapshot covers exactly
    /// one channel.
    #[error("Operation requires a single-channel snapshot, but {channels} channels are present")]
    AmbiguousScope {
        /// How many distinct channels the snapshot spans.
        channels: usize,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatStatsError {
    /// Creates an unknown-period validation error.
    pub fn unknown_period(input: impl Into<String>) -> Self {
        ChatStatsError::UnknownPeriod {
            input: input.into(),
        }
    }

    /// Creates an unknown-subject validation error.
    pub fn unknown_subject(input: impl Into<String>) -> Self {
        ChatStatsError::UnknownSubject {
            input: input.into(),
        }
    }

    /// Creates an unknown-statistic validation error.
    pub fn unknown_statistic(input: impl Into<String>) -> Self {
        ChatStatsError::UnknownStatistic {
            input: input.into(),
        }
    }

    /// Creates an invalid-date validation error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatStatsError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Returns `true` if this is a boundary validation error (as opposed
    /// to a population or scope error).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ChatStatsError::UnknownPeriod { .. }
                | ChatStatsError::UnknownSubject { .. }
                | ChatStatsError::UnknownStatistic { .. }
                | ChatStatsError::InvalidDate { .. }
                | ChatStatsError::IncompleteDateFilter { .. }
        )
    }
}
