//! The composable filter pipeline.
//!
//! A [`FilterQuery`] collects up to four filter axes — channels,
//! participants, sender subject, date range — and applies them to a record
//! collection in one fixed order:
//!
//! 1. **Channel**: keep records whose channel is in the requested set.
//! 2. **Participant**: keep channels whose participant set intersects the
//!    requested people.
//! 3. **Subject**: keep records by sender (`all` / `me` / `partner` / a
//!    literal name).
//! 4. **Date**: keep records inside the resolved time range.
//!
//! The order is fixed because participant and subject filtering do not
//! commute (a participant belongs to a channel; a subject is a sender).
//! Filtering never reorders records and never mutates the source; a query
//! that matches nothing yields an empty, valid result.
//!
//! # Examples
//!
//! ```
//! use chatstats::filter::{FilterQuery, Subject};
//!
//! # fn main() -> chatstats::Result<()> {
//! let query = FilterQuery::new()
//!     .with_channels(["Tőke Hal"])
//!     .with_subject(Subject::Me)
//!     .with_start_date("2014-11-01")?
//!     .with_period("m")?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChatStatsError, Result};
use crate::message::MessageRecord;
use crate::period::Period;

/// The sender axis of a filter: whose messages to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Keep every sender.
    All,
    /// Keep only the account owner's messages.
    Me,
    /// Keep everyone except the account owner.
    Partner,
    /// Keep only the named sender.
    Person(String),
}

impl FromStr for Subject {
    type Err = ChatStatsError;

    /// Parses a subject token.
    ///
    /// `all`, `me`, and `partner` are keywords (ASCII case-insensitive);
    /// any other non-blank token is taken as a literal sender name. A
    /// blank token is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ChatStatsError::unknown_subject(s));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "all" => Ok(Subject::All),
            "me" => Ok(Subject::Me),
            "partner" => Ok(Subject::Partner),
            _ => Ok(Subject::Person(trimmed.to_string())),
        }
    }
}

/// Context a query needs beyond the records themselves: who the owner is,
/// the platform epoch, and each channel's participant set.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// The account owner's display name.
    pub owner: &'a str,
    /// Default start bound for period-only date filters.
    pub platform_epoch: DateTime<Utc>,
    /// Participant sets keyed by channel identifier.
    pub participants_by_channel: &'a HashMap<String, BTreeSet<String>>,
}

/// A resolved date range ready to test timestamps against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    /// `[start, end)` when a period was added onto a start bound,
    /// `[start, end]` otherwise.
    end_exclusive: bool,
}

impl ResolvedRange {
    fn contains(&self, ts: DateTime<Utc>) -> bool {
        if ts < self.start {
            return false;
        }
        if self.end_exclusive {
            ts < self.end
        } else {
            ts <= self.end
        }
    }
}

/// An ordered, composable set of filter criteria.
///
/// Queries are cheap value objects built with `with_*` methods; applying
/// one never mutates the source collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterQuery {
    /// Keep only these channels. `None` or empty is a no-op.
    pub channels: Option<Vec<String>>,
    /// Keep only channels containing at least one of these people.
    pub participants: Option<Vec<String>>,
    /// Keep only messages from this subject.
    pub subject: Option<Subject>,
    /// Start of the date range.
    pub start: Option<DateTime<Utc>>,
    /// End of the date range.
    pub end: Option<DateTime<Utc>>,
    /// Period used to derive a missing start or end bound.
    pub period: Option<Period>,
}

impl FilterQuery {
    /// Creates an empty query; applying it keeps every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the channel filter.
    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = Some(channels.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the participant filter.
    #[must_use]
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = Some(participants.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the subject filter.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Parses and sets the subject filter from a token.
    pub fn with_subject_str(mut self, subject: &str) -> Result<Self> {
        self.subject = Some(subject.parse()?);
        Ok(self)
    }

    /// Sets the start bound directly.
    #[must_use]
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the end bound directly.
    #[must_use]
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Parses `YYYY-MM-DD` and sets the start bound at start of day.
    pub fn with_start_date(mut self, date_str: &str) -> Result<Self> {
        self.start = Some(parse_date(date_str)?);
        Ok(self)
    }

    /// Parses `YYYY-MM-DD` and sets the end bound at end of day.
    pub fn with_end_date(mut self, date_str: &str) -> Result<Self> {
        let start_of_day = parse_date(date_str)?;
        // End of the day so the whole day is included.
        self.end = Some(start_of_day + chrono::Duration::seconds(86_399));
        Ok(self)
    }

    /// Parses and sets the period.
    pub fn with_period(mut self, token: &str) -> Result<Self> {
        self.period = Some(token.parse()?);
        Ok(self)
    }

    /// Returns `true` if any axis is set.
    pub fn is_active(&self) -> bool {
        self.channels.is_some()
            || self.participants.is_some()
            || self.subject.is_some()
            || self.has_date_axis()
    }

    fn has_date_axis(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.period.is_some()
    }

    /// Resolves the date axis into a concrete range.
    ///
    /// Resolution rules, given which of {start, end, period} are set:
    /// - start + end → inclusive `[start, end]` (period, if set, is ignored);
    /// - start + period → `[start, start + Δ)`;
    /// - end + period → `[end − Δ, end]`;
    /// - period only → `[platform epoch, now]`;
    /// - start only or end only → [`ChatStatsError::IncompleteDateFilter`];
    /// - none → no date filtering.
    fn resolve_range(&self, ctx: &FilterContext<'_>) -> Result<Option<ResolvedRange>> {
        let range = match (self.start, self.end, self.period) {
            (None, None, None) => None,
            (Some(start), Some(end), _) => Some(ResolvedRange {
                start,
                end,
                end_exclusive: false,
            }),
            (Some(start), None, Some(period)) => Some(ResolvedRange {
                start,
                end: period.advance(start),
                end_exclusive: true,
            }),
            (None, Some(end), Some(period)) => Some(ResolvedRange {
                start: period.retreat(end),
                end,
                end_exclusive: false,
            }),
            (None, None, Some(_)) => Some(ResolvedRange {
                start: ctx.platform_epoch,
                end: Utc::now(),
                end_exclusive: false,
            }),
            (Some(_), None, None) => {
                return Err(ChatStatsError::IncompleteDateFilter { supplied: "start" });
            }
            (None, Some(_), None) => {
                return Err(ChatStatsError::IncompleteDateFilter { supplied: "end" });
            }
        };
        Ok(range)
    }

    /// Applies every active axis in the documented order.
    ///
    /// Returns the surviving records in their original order. Validation
    /// errors surface before any record is inspected.
    pub fn apply(&self, records: &[MessageRecord], ctx: &FilterContext<'_>) -> Result<Vec<MessageRecord>> {
        let range = self.resolve_range(ctx)?;
        let matching_channels = self.matching_channels(ctx);

        let kept = records
            .iter()
            .filter(|record| {
                if let Some(ref channels) = matching_channels {
                    if !channels.contains(record.channel()) {
                        return false;
                    }
                }
                if let Some(ref subject) = self.subject {
                    if !subject_matches(subject, record.sender(), ctx.owner) {
                        return false;
                    }
                }
                if let Some(range) = range {
                    if !range.contains(record.timestamp()) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        Ok(kept)
    }

    /// Combines the channel and participant axes into one channel set.
    ///
    /// `None` means no channel-level restriction. The participant axis
    /// admits exactly the channels whose participant set intersects the
    /// request; a channel missing from the index never matches.
    fn matching_channels(&self, ctx: &FilterContext<'_>) -> Option<BTreeSet<String>> {
        let explicit = self
            .channels
            .as_ref()
            .filter(|c| !c.is_empty())
            .map(|channels| channels.iter().cloned().collect::<BTreeSet<String>>());

        let by_participant = self
            .participants
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|people| {
                ctx.participants_by_channel
                    .iter()
                    .filter(|(_, members)| {
                        people.iter().any(|person| {
                            members.iter().any(|m| m.eq_ignore_ascii_case(person))
                        })
                    })
                    .map(|(channel, _)| channel.clone())
                    .collect::<BTreeSet<String>>()
            });

        match (explicit, by_participant) {
            (None, None) => None,
            (Some(set), None) | (None, Some(set)) => Some(set),
            (Some(a), Some(b)) => Some(a.intersection(&b).cloned().collect()),
        }
    }
}

fn subject_matches(subject: &Subject, sender: &str, owner: &str) -> bool {
    match subject {
        Subject::All => true,
        Subject::Me => sender.eq_ignore_ascii_case(owner),
        Subject::Partner => !sender.eq_ignore_ascii_case(owner),
        Subject::Person(name) => sender.eq_ignore_ascii_case(name),
    }
}

/// Parse a date string in YYYY-MM-DD format to start of day, UTC.
fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ChatStatsError::invalid_date(date_str))?;
    Ok(naive.and_hms_opt(0, 0, 0).unwrap().and_utc())
}
