//! Plugin system for text commands.
//!
//! Commands are plain text, not slash commands:
//! - `help` (any case) lists the commands
//! - `status` shows the sender's tasbih counts
//! - one of the tasbih phrases counts it and shows the counts
//!
//! Everything except `help` is matched case-sensitively.

pub mod help;
pub mod tasbih;

pub use tasbih::{CounterTracker, Phrase};

pub const HELP_KEYWORD: &str = "help";
pub const STATUS_KEYWORD: &str = "status";

/// A recognised text command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Count(Phrase),
}

impl Command {
    /// Parse trimmed message text. `None` means the bot stays silent.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.to_lowercase() == HELP_KEYWORD {
            return Some(Self::Help);
        }
        if text == STATUS_KEYWORD {
            return Some(Self::Status);
        }
        Phrase::from_text(text).map(Self::Count)
    }
}

/// Route a message to its reply.
///
/// The sender's counter record must already exist (see [`CounterTracker::ensure`]).
pub fn route(counters: &CounterTracker, sender: &str, text: &str) -> Option<String> {
    match Command::parse(text)? {
        Command::Help => Some(help::help_text()),
        Command::Status => counters.status(sender),
        Command::Count(phrase) => {
            counters.increment(sender, phrase)?;
            counters.status(sender)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_is_case_insensitive() {
        for input in ["help", "HELP", "Help", "  hElP  "] {
            assert_eq!(Command::parse(input), Some(Command::Help), "{input:?}");
        }
    }

    #[test]
    fn test_other_commands_are_case_sensitive() {
        assert_eq!(Command::parse("status"), Some(Command::Status));
        assert_eq!(Command::parse("Status"), None);
        assert_eq!(Command::parse("Subhanallah"), Some(Command::Count(Phrase::Subhanallah)));
        assert_eq!(Command::parse("SUBHANALLAH"), None);
        assert_eq!(Command::parse("allahu akbar"), None);
    }

    #[test]
    fn test_unknown_text_is_silent() {
        let counters = CounterTracker::new();
        counters.ensure("u");
        assert_eq!(route(&counters, "u", "hello there"), None);
        assert_eq!(route(&counters, "u", ""), None);
    }

    #[test]
    fn test_route_count_replies_with_status() {
        let counters = CounterTracker::new();
        counters.ensure("u");

        route(&counters, "u", "Allahu Akbar");
        let reply = route(&counters, "u", "Allahu Akbar").unwrap();
        assert_eq!(reply, "Subhanallah: 0/33\nAlhamdulillah: 0/33\nAllahu Akbar: 2/33");
    }

    #[test]
    fn test_route_status_does_not_count() {
        let counters = CounterTracker::new();
        counters.ensure("u");

        let first = route(&counters, "u", "status").unwrap();
        let second = route(&counters, "u", "status").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_route_help() {
        let counters = CounterTracker::new();
        counters.ensure("u");
        assert_eq!(route(&counters, "u", "HELP"), Some(help::help_text()));
    }
}
