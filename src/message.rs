//! The immutable unit of data: one message inside one channel.
//!
//! This module provides [`MessageRecord`], the normalized representation
//! that the ingestion layer hands to the statistics core. All aggregates in
//! the crate are derived from ordered collections of these records.
//!
//! # Overview
//!
//! A record consists of:
//! - **Required**: `sender`, `timestamp`, `channel`
//! - **Optional**: `text`, `media`, `reactions`
//!
//! For text/media classification, at most one of `text` and `media` is
//! meaningfully populated. Both may be absent (a pure reaction event) or,
//! rarely, both present (a captioned attachment).
//!
//! # Examples
//!
//! ```
//! use chatstats::message::{MessageRecord, MediaKind};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2014, 11, 2, 9, 30, 0).unwrap();
//! let msg = MessageRecord::new("Tőke Hal", "Tőke Hal", ts).with_text("szia");
//! assert!(msg.is_text());
//! assert!(!msg.is_media());
//!
//! let photo = MessageRecord::new("Alice", "marathon", ts).with_media(MediaKind::Photo);
//! assert!(photo.is_media());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of media attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// A photo attachment.
    Photo,
    /// A video attachment.
    Video,
    /// A voice note or audio file.
    Audio,
    /// A generic file attachment.
    File,
    /// An animated GIF.
    Gif,
}

/// A single reaction left on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// The person who reacted.
    pub actor: String,
    /// The reaction emoji.
    pub emoji: String,
}

impl Reaction {
    /// Creates a new reaction.
    pub fn new(actor: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            emoji: emoji.into(),
        }
    }
}

/// A normalized message record from any messaging platform.
///
/// Records are produced once by the ingestion layer and never mutated.
/// Every statistic in the crate is a pure function over collections of
/// these.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `sender` | `String` | Display name of the message author |
/// | `timestamp` | `DateTime<Utc>` | When the message was sent |
/// | `text` | `Option<String>` | Text content, if any |
/// | `media` | `Option<MediaKind>` | Attachment kind, if any |
/// | `reactions` | `Vec<Reaction>` | Reactions left on the message |
/// | `channel` | `String` | Identifier of the containing conversation |
///
/// # Construction
///
/// Use [`MessageRecord::new`] plus builder methods:
///
/// ```
/// use chatstats::message::MessageRecord;
/// use chrono::Utc;
///
/// let msg = MessageRecord::new("Alice", "book club", Utc::now())
///     .with_text("see you at eight");
/// assert_eq!(msg.sender(), "Alice");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Display name of the message author.
    pub sender: String,

    /// When the message was sent.
    pub timestamp: DateTime<Utc>,

    /// Text content of the message.
    ///
    /// `None` for pure media or reaction events.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub text: Option<String>,

    /// Media attachment kind, if the message carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media: Option<MediaKind>,

    /// Reactions left on this message. Empty when nobody reacted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub reactions: Vec<Reaction>,

    /// Identifier of the conversation this record belongs to.
    pub channel: String,
}

impl MessageRecord {
    /// Creates a new record with no text, media, or reactions.
    pub fn new(
        sender: impl Into<String>,
        channel: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: sender.into(),
            timestamp,
            text: None,
            media: None,
            reactions: Vec::new(),
            channel: channel.into(),
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Builder method to set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder method to set the media attachment.
    #[must_use]
    pub fn with_media(mut self, media: MediaKind) -> Self {
        self.media = Some(media);
        self
    }

    /// Builder method to append a reaction.
    #[must_use]
    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the channel identifier.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns the timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Returns `true` if this record counts as a text message.
    ///
    /// Blank or whitespace-only text does not count.
    pub fn is_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Returns `true` if this record carries a media attachment.
    pub fn is_media(&self) -> bool {
        self.media.is_some()
    }

    /// Returns `true` if at least one reaction was left on this record.
    pub fn has_reactions(&self) -> bool {
        !self.reactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 11, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_record_new() {
        let msg = MessageRecord::new("Alice", "book club", ts());
        assert_eq!(msg.sender(), "Alice");
        assert_eq!(msg.channel(), "book club");
        assert!(!msg.is_text());
        assert!(!msg.is_media());
        assert!(!msg.has_reactions());
    }

    #[test]
    fn test_record_builder() {
        let msg = MessageRecord::new("Alice", "book club", ts())
            .with_text("hello")
            .with_reaction(Reaction::new("Bob", "❤"));

        assert!(msg.is_text());
        assert!(msg.has_reactions());
        assert_eq!(msg.reactions.len(), 1);
        assert_eq!(msg.reactions[0].actor, "Bob");
    }

    #[test]
    fn test_blank_text_is_not_text() {
        let msg = MessageRecord::new("Alice", "c", ts()).with_text("   ");
        assert!(!msg.is_text());
    }

    #[test]
    fn test_media_classification() {
        let msg = MessageRecord::new("Alice", "c", ts()).with_media(MediaKind::Gif);
        assert!(msg.is_media());
        assert!(!msg.is_text());
    }

    #[test]
    fn test_both_text_and_media() {
        // A captioned attachment counts as both.
        let msg = MessageRecord::new("Alice", "c", ts())
            .with_text("look at this")
            .with_media(MediaKind::Photo);
        assert!(msg.is_text());
        assert!(msg.is_media());
    }

    #[test]
    fn test_serialization_skips_empty_optionals() {
        let msg = MessageRecord::new("Alice", "c", ts());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("\"text\""));
        assert!(!json.contains("\"media\""));
        assert!(!json.contains("\"reactions\""));
    }

    #[test]
    fn test_deserialization_round_trip() {
        let msg = MessageRecord::new("Alice", "c", ts())
            .with_text("hi")
            .with_media(MediaKind::Video);
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: MessageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, parsed);
    }
}
