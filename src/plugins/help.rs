//! Help command plugin.

use super::tasbih::Phrase;
use super::{HELP_KEYWORD, STATUS_KEYWORD};

/// Build the static command list.
pub fn help_text() -> String {
    let mut text = String::from("📿 Available commands:\n\n");
    text.push_str(&format!("{} - show this list\n", HELP_KEYWORD));
    text.push_str(&format!("{} - show your tasbih counts\n", STATUS_KEYWORD));
    for phrase in Phrase::ALL {
        text.push_str(&format!("{} - count one {}\n", phrase.label(), phrase.label()));
    }
    text.push_str("\nLinks are not allowed. Repeated links will remove you from broadcasts.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_command() {
        let text = help_text();
        assert!(text.contains("help"));
        assert!(text.contains("status"));
        for phrase in Phrase::ALL {
            assert!(text.contains(phrase.label()));
        }
    }
}
