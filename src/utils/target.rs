//! Identifier helpers.
//!
//! Recipient identifiers are stored as opaque strings. These helpers map
//! Telegram chats and senders onto those strings and back.

use teloxide::types::{ChatId, Message, Recipient};

use crate::database::RecipientKind;

/// Where an inbound message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Chat identifier registered in the recipient store.
    pub chat: String,
    pub kind: RecipientKind,
    /// Per-user key for counters and link offenses.
    pub sender: String,
}

impl Origin {
    /// Classify a message. `None` for channel posts and other chats the bot
    /// does not track.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let kind = if msg.chat.is_group() || msg.chat.is_supergroup() {
            RecipientKind::Group
        } else if msg.chat.is_private() {
            RecipientKind::User
        } else {
            return None;
        };

        let chat = msg.chat.id.0.to_string();
        // Anonymous group admins have no `from`; fall back to the chat.
        let sender = msg
            .from
            .as_ref()
            .map_or_else(|| chat.clone(), |u| u.id.0.to_string());

        Some(Self { chat, kind, sender })
    }
}

/// Turn a stored identifier into something `send_message` accepts.
///
/// Numeric ids become chat ids; anything else (e.g. `@channel`) is passed
/// through as a username.
pub fn parse_recipient(id: &str) -> Recipient {
    match id.parse::<i64>() {
        Ok(n) => Recipient::Id(ChatId(n)),
        Err(_) => Recipient::ChannelUsername(id.to_string()),
    }
}
