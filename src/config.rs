//! Analyzer configuration.
//!
//! The statistics core needs two pieces of ambient context: who the account
//! owner is (for `me`/`partner` subject filters and `created_by_me`) and
//! the platform's epoch date (the default start bound when a date filter is
//! given only a period). Both are resolved once at startup and threaded by
//! reference through every query — there is no global owner constant.
//!
//! # Example
//!
//! ```rust
//! use chatstats::config::AnalyzerConfig;
//!
//! let config = AnalyzerConfig::new("Alice Smith");
//! assert!(config.is_owner("alice smith"));
//! assert!(!config.is_owner("Bob"));
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Configuration shared by every analyzer and stats snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Display name of the account owner, exactly as it appears as a
    /// sender in the export.
    pub owner: String,

    /// Earliest date any message on the platform could carry. Used as the
    /// default start bound for period-only date filters.
    pub platform_epoch: DateTime<Utc>,
}

impl AnalyzerConfig {
    /// Creates a configuration with the default platform epoch
    /// (2004-02-04, the founding date of the oldest supported platform).
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            platform_epoch: default_epoch(),
        }
    }

    /// Builder method to override the platform epoch.
    #[must_use]
    pub fn with_platform_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.platform_epoch = epoch;
        self
    }

    /// Returns the owner's display name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns `true` if `sender` is the account owner.
    ///
    /// Matching is ASCII case-insensitive, consistent with sender filters.
    pub fn is_owner(&self, sender: &str) -> bool {
        self.owner.eq_ignore_ascii_case(sender)
    }
}

fn default_epoch() -> DateTime<Utc> {
    // 2004-02-04 00:00:00 UTC is always representable.
    Utc.with_ymd_and_hms(2004, 2, 4, 0, 0, 0).unwrap()
}
