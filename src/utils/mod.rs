//! Utility functions.
//!
//! Collection of helper functions used across the bot.

pub mod target;

pub use target::{Origin, parse_recipient};

/// Truncate a string for log output.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
