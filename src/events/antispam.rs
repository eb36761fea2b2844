//! Link spam event handler.
//!
//! Counts messages carrying links per sender and evicts repeat offenders
//! from the broadcast list.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::database::RecipientStore;

/// Offense count at which a sender is evicted from the user set.
pub const EVICTION_THRESHOLD: u32 = 4;

/// Reply sent from the second offense onward.
pub const LINK_WARNING: &str = "⚠️ Please do not repeat links in this chat.";

/// Scheme-prefixed (`https://`, `ftp://`, ...) or `www.`-prefixed substring.
///
/// Unanchored: a link glued to the preceding word still counts.
static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[a-z][a-z0-9+.\-]*://|www\.)\S+").expect("link pattern is valid")
});

/// Result of checking one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    /// No link found; continue dispatching.
    Clean,
    /// A link was found; dispatch must stop here.
    Link {
        /// Send [`LINK_WARNING`] back to the sender.
        warn: bool,
        /// Offense count after this message.
        offenses: u32,
        /// The sender was removed from the user set.
        evicted: bool,
    },
}

impl SpamVerdict {
    #[allow(dead_code)]
    pub fn is_spam(&self) -> bool {
        matches!(self, Self::Link { .. })
    }
}

/// Whether the text contains anything that looks like a URL.
pub fn contains_link(text: &str) -> bool {
    LINK_PATTERN.is_match(text)
}

/// Per-sender link offense counters (in-memory, never reset).
#[derive(Clone, Default)]
pub struct LinkTracker {
    offenses: Arc<DashMap<String, u32>>,
}

impl LinkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a message and apply the offense rules.
    ///
    /// The warning is decided before the counter is bumped, so the first
    /// offense is silent and every later one is warned.
    pub fn check(&self, sender: &str, text: &str, recipients: &RecipientStore) -> SpamVerdict {
        if !contains_link(text) {
            return SpamVerdict::Clean;
        }

        let offenses = {
            let mut entry = self.offenses.entry(sender.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        let warn = offenses > 1;

        let mut evicted = false;
        if offenses >= EVICTION_THRESHOLD {
            info!("Evicting {} after {} link offenses", sender, offenses);
            // In-memory eviction stands even if the write fails.
            if let Err(e) = recipients.evict(sender) {
                warn!("Failed to persist eviction of {}: {}", sender, e);
            }
            evicted = true;
        }

        SpamVerdict::Link {
            warn,
            offenses,
            evicted,
        }
    }

    /// Current offense count for a sender.
    #[allow(dead_code)]
    pub fn offenses(&self, sender: &str) -> u32 {
        self.offenses.get(sender).map_or(0, |v| *v)
    }
}
