//! Tasbih counter plugin.
//!
//! Tracks how many times each user has sent each of the three phrases.
//! Counts live in memory only and are lost on restart.

use std::sync::Arc;

use dashmap::DashMap;

/// Conventional count per phrase. Shown in the status but never enforced.
pub const TASBIH_LIMIT: u64 = 33;

/// The three counted phrases, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Subhanallah,
    Alhamdulillah,
    AllahuAkbar,
}

impl Phrase {
    pub const ALL: [Phrase; 3] = [Self::Subhanallah, Self::Alhamdulillah, Self::AllahuAkbar];

    /// The exact text a user sends to count this phrase.
    pub fn label(self) -> &'static str {
        match self {
            Self::Subhanallah => "Subhanallah",
            Self::Alhamdulillah => "Alhamdulillah",
            Self::AllahuAkbar => "Allahu Akbar",
        }
    }

    /// Case-sensitive exact match against the labels.
    pub fn from_text(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == text)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One user's counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TasbihRecord {
    counts: [u64; 3],
}

impl TasbihRecord {
    pub fn count(&self, phrase: Phrase) -> u64 {
        self.counts[phrase.index()]
    }

    /// Render `label: count/33` lines in fixed order.
    pub fn render(&self) -> String {
        Phrase::ALL
            .iter()
            .map(|p| format!("{}: {}/{}", p.label(), self.count(*p), TASBIH_LIMIT))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Per-user tasbih counters.
#[derive(Clone, Default)]
pub struct CounterTracker {
    records: Arc<DashMap<String, TasbihRecord>>,
}

impl CounterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zeroed record for `user` if none exists.
    pub fn ensure(&self, user: &str) {
        self.records.entry(user.to_string()).or_default();
    }

    /// Bump one counter. `None` if [`ensure`](Self::ensure) was never called.
    pub fn increment(&self, user: &str, phrase: Phrase) -> Option<TasbihRecord> {
        let mut record = self.records.get_mut(user)?;
        record.counts[phrase.index()] += 1;
        Some(*record)
    }

    /// Status text for `user`. `None` if [`ensure`](Self::ensure) was never called.
    pub fn status(&self, user: &str) -> Option<String> {
        self.records.get(user).map(|r| r.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_exact_match() {
        assert_eq!(Phrase::from_text("Subhanallah"), Some(Phrase::Subhanallah));
        assert_eq!(Phrase::from_text("Allahu Akbar"), Some(Phrase::AllahuAkbar));
        assert_eq!(Phrase::from_text("subhanallah"), None);
        assert_eq!(Phrase::from_text("ALHAMDULILLAH"), None);
    }

    #[test]
    fn test_fresh_status() {
        let tracker = CounterTracker::new();
        tracker.ensure("u");
        assert_eq!(
            tracker.status("u").unwrap(),
            "Subhanallah: 0/33\nAlhamdulillah: 0/33\nAllahu Akbar: 0/33"
        );
    }

    #[test]
    fn test_ensure_keeps_existing_counts() {
        let tracker = CounterTracker::new();
        tracker.ensure("u");
        tracker.increment("u", Phrase::Alhamdulillah);
        tracker.ensure("u");
        assert_eq!(tracker.increment("u", Phrase::Alhamdulillah).unwrap().count(Phrase::Alhamdulillah), 2);
    }

    #[test]
    fn test_counts_past_limit_are_not_clamped() {
        let tracker = CounterTracker::new();
        tracker.ensure("u");
        for _ in 0..40 {
            tracker.increment("u", Phrase::Subhanallah);
        }
        let status = tracker.status("u").unwrap();
        assert!(status.starts_with("Subhanallah: 40/33\n"));
    }

    #[test]
    fn test_missing_record() {
        let tracker = CounterTracker::new();
        assert!(tracker.status("ghost").is_none());
        assert!(tracker.increment("ghost", Phrase::AllahuAkbar).is_none());
    }

    #[test]
    fn test_records_are_per_user() {
        let tracker = CounterTracker::new();
        tracker.ensure("a");
        tracker.ensure("b");
        tracker.increment("a", Phrase::AllahuAkbar);

        assert_eq!(tracker.increment("b", Phrase::AllahuAkbar).unwrap().count(Phrase::AllahuAkbar), 1);
    }
}
