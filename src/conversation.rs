//! Conversations: ordered message collections with participant metadata.
//!
//! A [`Conversation`] is one channel of a messaging export: its title, its
//! participant set, its kind (private or group), and its timestamp-ordered
//! records. Conversations are assembled by the ingestion layer; the core
//! only requires that same-title sources can be merged without losing or
//! duplicating records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::MessageRecord;

/// Whether a channel is a one-to-one or a group conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// A one-to-one conversation (the owner and one partner).
    Private,
    /// A group conversation with N participants.
    Group,
}

/// One channel: title, participants, kind, and its ordered records.
///
/// Records are sorted by timestamp at construction and stay sorted through
/// [`merge`](Conversation::merge), so every downstream view can rely on
/// timestamp ordering.
///
/// # Example
///
/// ```
/// use chatstats::conversation::{ChannelKind, Conversation};
/// use chatstats::message::MessageRecord;
/// use chrono::{TimeZone, Utc};
///
/// let ts = |h| Utc.with_ymd_and_hms(2014, 9, 24, h, 0, 0).unwrap();
/// let convo = Conversation::new(
///     "Tőke Hal",
///     ChannelKind::Private,
///     ["Dénes Kiss", "Tőke Hal"],
///     vec![
///         MessageRecord::new("Tőke Hal", "Tőke Hal", ts(10)).with_text("szia"),
///         MessageRecord::new("Dénes Kiss", "Tőke Hal", ts(9)).with_text("hali"),
///     ],
/// );
/// // Re-sorted: the 09:00 message comes first, so its sender is the creator.
/// assert_eq!(convo.creator(), Some("Dénes Kiss"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Channel title. For private conversations this is typically the
    /// partner's name.
    pub title: String,

    /// Private or group.
    pub kind: ChannelKind,

    /// Everyone who belongs to the channel, including the account owner.
    pub participants: BTreeSet<String>,

    /// Message records, sorted ascending by timestamp.
    pub records: Vec<MessageRecord>,
}

impl Conversation {
    /// Creates a conversation, sorting its records by timestamp.
    pub fn new<P, S>(
        title: impl Into<String>,
        kind: ChannelKind,
        participants: P,
        mut records: Vec<MessageRecord>,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        records.sort_by_key(MessageRecord::timestamp);
        Self {
            title: title.into(),
            kind,
            participants: participants.into_iter().map(Into::into).collect(),
            records,
        }
    }

    /// Returns the channel title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the sender of the earliest record, if any.
    ///
    /// Export tooling treats this person as the conversation's creator.
    pub fn creator(&self) -> Option<&str> {
        self.records.first().map(MessageRecord::sender)
    }

    /// Returns the timestamp of the earliest record, if any.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.records.first().map(MessageRecord::timestamp)
    }

    /// Returns the number of participants.
    pub fn size(&self) -> usize {
        self.participants.len()
    }

    /// Absorbs another same-title conversation.
    ///
    /// Exports split one logical conversation across several source files;
    /// merging unions participants and records and re-sorts by timestamp.
    pub fn merge(&mut self, other: Conversation) {
        self.participants.extend(other.participants);
        self.records.extend(other.records);
        self.records.sort_by_key(MessageRecord::timestamp);
    }
}
