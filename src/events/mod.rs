//! Message event handling.
//!
//! Every text message goes through the link filter first; only clean
//! messages reach the command plugins.

pub mod antispam;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use tracing::{debug, warn};

pub use antispam::{LinkTracker, SpamVerdict};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::plugins;
use crate::utils::{Origin, truncate};

/// Build the message event handler.
pub fn message_event_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter_map(|msg: Message| msg.text().map(str::to_owned)).endpoint(text_message_handler)
}

/// Reply to a text message, if it calls for a reply.
async fn text_message_handler(
    bot: ThrottledBot,
    msg: Message,
    origin: Origin,
    text: String,
    state: AppState,
) -> anyhow::Result<()> {
    debug!(
        "text_message_handler: chat={}, sender={}, text='{}'",
        origin.chat,
        origin.sender,
        truncate(&text, 30)
    );

    let Some(reply) = handle_text(&state, &origin, &text) else {
        return Ok(());
    };

    // Delivery is best-effort; a failed reply is never retried.
    if let Err(e) = bot
        .send_message(msg.chat.id, reply)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await
    {
        warn!("Failed to reply in chat {}: {}", origin.chat, e);
    }

    Ok(())
}

/// Decide the reply for one text message.
///
/// Order matters: the link filter runs first and short-circuits, then the
/// sender's counter record is created, then the command is routed.
pub fn handle_text(state: &AppState, origin: &Origin, text: &str) -> Option<String> {
    let verdict = state.links.check(&origin.sender, text, &state.recipients);
    if let SpamVerdict::Link { warn, offenses, evicted } = verdict {
        debug!(
            "Link from {} (offense {}, evicted: {})",
            origin.sender, offenses, evicted
        );
        return warn.then(|| antispam::LINK_WARNING.to_string());
    }

    state.counters.ensure(&origin.sender);
    plugins::route(&state.counters, &origin.sender, text)
}
