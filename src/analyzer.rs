//! Per-kind analyzers and the cross-kind manager.
//!
//! A [`MessagingAnalyzer`] owns the channel map for one conversation kind
//! (private or group), a participant→channels index built once at
//! construction, and one base [`ConversationStats`] over the concatenated,
//! timestamp-sorted records of every channel. Scoped views — per channel,
//! per participant, or via [`filter`](MessagingAnalyzer::filter) — produce
//! fresh snapshots or analyzers and never mutate the source.
//!
//! [`MessagingAnalyzerManager`] pairs the two analyzers and answers the
//! questions that span both kinds: who appears in both, how much private
//! traffic flows with a group's members, and whether a private
//! conversation predates any group conversation with the same person.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::conversation::{ChannelKind, Conversation};
use crate::message::MessageRecord;
use crate::stats::{ConversationStats, StatsContext};

/// Min/max/mean participant-set cardinality across an analyzer's channels.
///
/// Independent of message volume: a silent group still counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSizeStats {
    /// Smallest participant set.
    pub min: usize,
    /// Largest participant set.
    pub max: usize,
    /// Mean participant-set size; 0 for an analyzer with no channels.
    pub mean: f64,
}

/// The analyzer for one conversation kind.
#[derive(Debug, Clone)]
pub struct MessagingAnalyzer {
    kind: ChannelKind,
    channels: BTreeMap<String, Conversation>,
    participant_index: BTreeMap<String, Vec<String>>,
    config: AnalyzerConfig,
    context: Arc<StatsContext>,
    stats: ConversationStats,
}

impl MessagingAnalyzer {
    /// Builds an analyzer from the conversations of one kind.
    ///
    /// Same-title conversations are merged (exports split long channels
    /// across files), the participant index is built once, and the base
    /// snapshot covers every record in timestamp order.
    pub fn new(kind: ChannelKind, conversations: Vec<Conversation>, config: AnalyzerConfig) -> Self {
        let mut channels: BTreeMap<String, Conversation> = BTreeMap::new();
        for convo in conversations {
            match channels.entry(convo.title.clone()) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(convo),
                Entry::Vacant(entry) => {
                    entry.insert(convo);
                }
            }
        }

        let mut participant_index: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (title, convo) in &channels {
            for person in &convo.participants {
                participant_index
                    .entry(person.clone())
                    .or_default()
                    .push(title.clone());
            }
        }

        let mut records: Vec<MessageRecord> = channels
            .values()
            .flat_map(|c| c.records.iter().cloned())
            .collect();
        records.sort_by_key(MessageRecord::timestamp);

        let index: HashMap<String, BTreeSet<String>> = channels
            .iter()
            .map(|(title, convo)| (title.clone(), convo.participants.clone()))
            .collect();
        let context = Arc::new(StatsContext::with_participants(config.clone(), index));
        let stats = ConversationStats::new(records, Arc::clone(&context));

        Self {
            kind,
            channels,
            participant_index,
            config,
            context,
            stats,
        }
    }

    /// This analyzer's conversation kind.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// The base snapshot over every channel of this analyzer.
    pub fn stats(&self) -> &ConversationStats {
        &self.stats
    }

    /// Channel titles, sorted.
    pub fn channel_titles(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Everyone who belongs to at least one channel, sorted.
    pub fn participants(&self) -> Vec<String> {
        self.participant_index.keys().cloned().collect()
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// The channels a person belongs to, per the index built at
    /// construction. Lookup is ASCII case-insensitive.
    pub fn channels_of(&self, person: &str) -> Vec<String> {
        self.participant_index
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(person))
            .flat_map(|(_, titles)| titles.iter().cloned())
            .collect()
    }

    /// Returns a new analyzer scoped to the matching channel subset.
    ///
    /// `channels` keeps only the named channels; `participants` keeps only
    /// channels containing at least one of the named people. Both axes
    /// compose with AND. The source analyzer is untouched.
    pub fn filter(
        &self,
        channels: Option<&[&str]>,
        participants: Option<&[&str]>,
    ) -> MessagingAnalyzer {
        let subset: Vec<Conversation> = self
            .channels
            .values()
            .filter(|convo| {
                if let Some(wanted) = channels {
                    if !wanted.iter().any(|w| *w == convo.title()) {
                        return false;
                    }
                }
                if let Some(people) = participants {
                    let hit = convo.participants.iter().any(|member| {
                        people.iter().any(|p| member.eq_ignore_ascii_case(p))
                    });
                    if !hit {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        MessagingAnalyzer::new(self.kind, subset, self.config.clone())
    }

    /// A snapshot over one channel's records, if the channel exists.
    pub fn stats_per_channel(&self, title: &str) -> Option<ConversationStats> {
        self.channels
            .get(title)
            .map(|convo| ConversationStats::new(convo.records.clone(), Arc::clone(&self.context)))
    }

    /// A snapshot over every channel containing the given person.
    pub fn stats_per_participant(&self, person: &str) -> ConversationStats {
        self.filter(None, Some(&[person])).stats().clone()
    }

    /// Timestamp of the earliest record across all channels.
    pub fn earliest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.stats.messages().first().map(MessageRecord::timestamp)
    }

    /// Min/max/mean channel size over participant-set cardinality.
    pub fn channel_size_stats(&self) -> ChannelSizeStats {
        let sizes: Vec<usize> = self.channels.values().map(Conversation::size).collect();
        if sizes.is_empty() {
            return ChannelSizeStats {
                min: 0,
                max: 0,
                mean: 0.0,
            };
        }
        let min = *sizes.iter().min().unwrap();
        let max = *sizes.iter().max().unwrap();
        let mean = sizes.iter().sum::<usize>() as f64 / sizes.len() as f64;
        ChannelSizeStats { min, max, mean }
    }

    /// Everyone except the account owner, sorted.
    fn partners(&self) -> BTreeSet<String> {
        self.participant_index
            .keys()
            .filter(|name| !self.config.is_owner(name))
            .cloned()
            .collect()
    }
}

/// Holds one analyzer per conversation kind and answers cross-kind queries.
#[derive(Debug, Clone)]
pub struct MessagingAnalyzerManager {
    private: MessagingAnalyzer,
    group: MessagingAnalyzer,
    config: AnalyzerConfig,
}

impl MessagingAnalyzerManager {
    /// Splits the conversations by kind and builds both analyzers.
    pub fn new(conversations: Vec<Conversation>, config: AnalyzerConfig) -> Self {
        let (private, group): (Vec<Conversation>, Vec<Conversation>) = conversations
            .into_iter()
            .partition(|c| c.kind == ChannelKind::Private);
        Self {
            private: MessagingAnalyzer::new(ChannelKind::Private, private, config.clone()),
            group: MessagingAnalyzer::new(ChannelKind::Group, group, config.clone()),
            config,
        }
    }

    /// The analyzer for one kind.
    pub fn analyzer(&self, kind: ChannelKind) -> &MessagingAnalyzer {
        match kind {
            ChannelKind::Private => &self.private,
            ChannelKind::Group => &self.group,
        }
    }

    /// The private-conversation analyzer.
    pub fn private(&self) -> &MessagingAnalyzer {
        &self.private
    }

    /// The group-conversation analyzer.
    pub fn group(&self) -> &MessagingAnalyzer {
        &self.group
    }

    /// One snapshot over both kinds' records.
    ///
    /// Participant indexes are merged so participant filters keep working;
    /// a title shared by a private and a group channel keeps the union of
    /// both participant sets.
    pub fn combined_stats(&self) -> ConversationStats {
        let mut records: Vec<MessageRecord> = self
            .private
            .stats()
            .messages()
            .iter()
            .chain(self.group.stats().messages())
            .cloned()
            .collect();
        records.sort_by_key(MessageRecord::timestamp);

        let mut index: HashMap<String, BTreeSet<String>> = HashMap::new();
        for analyzer in [&self.private, &self.group] {
            for (title, convo) in &analyzer.channels {
                index
                    .entry(title.clone())
                    .or_default()
                    .extend(convo.participants.iter().cloned());
            }
        }
        let context = Arc::new(StatsContext::with_participants(self.config.clone(), index));
        ConversationStats::new(records, context)
    }

    /// People the owner messages privately who also share a group, sorted.
    pub fn people_in_both(&self) -> Vec<String> {
        self.private
            .partners()
            .intersection(&self.group.partners())
            .cloned()
            .collect()
    }

    /// How many messages the owner exchanges privately with the members
    /// of the named group. `None` if the group does not exist.
    pub fn private_mc_with_members_of(&self, group_title: &str) -> Option<u64> {
        let group = self.group.channels.get(group_title)?;
        let members: Vec<&str> = group
            .participants
            .iter()
            .filter(|p| !self.config.is_owner(p))
            .map(String::as_str)
            .collect();
        if members.is_empty() {
            return Some(0);
        }
        Some(self.private.filter(None, Some(&members)).stats().mc())
    }

    /// Whether the private conversation with a person started before any
    /// group conversation including them.
    ///
    /// `None` when the person has no private records or no group records
    /// — there is nothing to compare.
    pub fn private_started_before_group(&self, person: &str) -> Option<bool> {
        let private_start = self
            .private
            .filter(None, Some(&[person]))
            .earliest_timestamp()?;
        let group_start = self
            .group
            .filter(None, Some(&[person]))
            .earliest_timestamp()?;
        Some(private_start < group_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, m, d, 12, 0, 0).unwrap()
    }

    fn private_convo(partner: &str, days: &[u32]) -> Conversation {
        let records = days
            .iter()
            .map(|d| MessageRecord::new(partner, partner, ts(3, *d)).with_text("hi"))
            .collect();
        Conversation::new(partner, ChannelKind::Private, ["Me", partner], records)
    }

    fn group_convo(title: &str, members: &[&str], days: &[u32]) -> Conversation {
        let records = days
            .iter()
            .map(|d| MessageRecord::new(members[0], title, ts(5, *d)).with_text("hey all"))
            .collect();
        let mut participants = vec!["Me"];
        participants.extend_from_slice(members);
        Conversation::new(title, ChannelKind::Group, participants, records)
    }

    fn manager() -> MessagingAnalyzerManager {
        let conversations = vec![
            private_convo("Anna", &[1, 2, 3]),
            private_convo("Bori", &[4]),
            group_convo("marathon", &["Anna", "Cili"], &[10, 11]),
        ];
        MessagingAnalyzerManager::new(conversations, AnalyzerConfig::new("Me"))
    }

    #[test]
    fn test_split_by_kind() {
        let m = manager();
        assert_eq!(m.private().channel_count(), 2);
        assert_eq!(m.group().channel_count(), 1);
        assert_eq!(m.private().stats().mc(), 4);
        assert_eq!(m.group().stats().mc(), 2);
    }

    #[test]
    fn test_same_title_conversations_merge() {
        let analyzer = MessagingAnalyzer::new(
            ChannelKind::Private,
            vec![private_convo("Anna", &[1]), private_convo("Anna", &[2])],
            AnalyzerConfig::new("Me"),
        );
        assert_eq!(analyzer.channel_count(), 1);
        assert_eq!(analyzer.stats().mc(), 2);
    }

    #[test]
    fn test_participant_index() {
        let m = manager();
        assert_eq!(m.group().channels_of("anna"), vec!["marathon"]);
        assert_eq!(m.private().channels_of("Anna"), vec!["Anna"]);
        assert!(m.private().channels_of("Cili").is_empty());
    }

    #[test]
    fn test_filter_does_not_mutate_source() {
        let m = manager();
        let scoped = m.private().filter(Some(&["Anna"]), None);
        assert_eq!(scoped.channel_count(), 1);
        assert_eq!(scoped.stats().mc(), 3);
        assert_eq!(m.private().channel_count(), 2);
    }

    #[test]
    fn test_filter_by_participant() {
        let m = manager();
        let scoped = m.group().filter(None, Some(&["cili"]));
        assert_eq!(scoped.channel_count(), 1);

        let none = m.group().filter(None, Some(&["Nobody"]));
        assert_eq!(none.channel_count(), 0);
        assert_eq!(none.stats().mc(), 0);
    }

    #[test]
    fn test_stats_per_channel() {
        let m = manager();
        let anna = m.private().stats_per_channel("Anna").unwrap();
        assert_eq!(anna.mc(), 3);
        assert!(m.private().stats_per_channel("missing").is_none());
    }

    #[test]
    fn test_channel_size_stats() {
        let m = manager();
        let private_sizes = m.private().channel_size_stats();
        assert_eq!(private_sizes.min, 2);
        assert_eq!(private_sizes.max, 2);
        assert!((private_sizes.mean - 2.0).abs() < f64::EPSILON);

        let group_sizes = m.group().channel_size_stats();
        assert_eq!(group_sizes.min, 3);

        let empty = MessagingAnalyzer::new(ChannelKind::Group, vec![], AnalyzerConfig::new("Me"));
        assert_eq!(empty.channel_size_stats().min, 0);
        assert!(empty.channel_size_stats().mean.abs() < f64::EPSILON);
    }

    #[test]
    fn test_people_in_both() {
        let m = manager();
        assert_eq!(m.people_in_both(), vec!["Anna"]);
    }

    #[test]
    fn test_private_mc_with_members_of() {
        let m = manager();
        // marathon members minus the owner: Anna (3 private records), Cili (0).
        assert_eq!(m.private_mc_with_members_of("marathon"), Some(3));
        assert_eq!(m.private_mc_with_members_of("no such group"), None);
    }

    #[test]
    fn test_private_started_before_group() {
        let m = manager();
        // Anna's private records are in March, marathon starts in May.
        assert_eq!(m.private_started_before_group("Anna"), Some(true));
        // Cili has no private conversation at all.
        assert_eq!(m.private_started_before_group("Cili"), None);
    }

    #[test]
    fn test_combined_stats_adds_up() {
        let m = manager();
        let combined = m.combined_stats();
        assert_eq!(
            combined.mc(),
            m.private().stats().mc() + m.group().stats().mc()
        );
    }
}
