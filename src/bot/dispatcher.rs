//! Update dispatcher setup.
//!
//! Builds the handler schema and drives it for updates received by the
//! webhook server.

use std::ops::ControlFlow;
use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use tracing::{debug, error, warn};

use crate::database::RecipientStore;
use crate::events::{self, LinkTracker};
use crate::plugins::CounterTracker;
use crate::utils::Origin;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Known groups and users, persisted to disk.
    pub recipients: Arc<RecipientStore>,

    /// Per-user tasbih counts (in memory).
    pub counters: CounterTracker,

    /// Per-user link offenses (in memory).
    pub links: LinkTracker,
}

impl AppState {
    /// Create a new application state.
    pub fn new(recipients: Arc<RecipientStore>) -> Self {
        Self {
            recipients,
            counters: CounterTracker::new(),
            links: LinkTracker::new(),
        }
    }
}

/// Build the handler schema.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    // Every tracked message registers its chat before anything else runs.
    let message_handler = Update::filter_message()
        .filter_map(|msg: Message| Origin::from_message(&msg))
        .inspect_async(register_origin)
        .branch(events::message_event_handler());

    dptree::entry().branch(message_handler)
}

/// Add the chat to the recipient store (runs before all handlers).
///
/// The store rewrites its file on every call, so the write runs on the
/// blocking pool instead of a runtime worker.
async fn register_origin(origin: Origin, state: AppState) {
    let recipients = state.recipients.clone();
    let chat = origin.chat.clone();
    let result =
        tokio::task::spawn_blocking(move || recipients.register(&origin.chat, origin.kind)).await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to persist recipient {}: {}", chat, e),
        Err(e) => warn!("Recipient registration task failed for {}: {}", chat, e),
    }
}

/// Run one update through the schema.
pub async fn dispatch(
    handler: &UpdateHandler<anyhow::Error>,
    bot: ThrottledBot,
    update: Update,
    state: AppState,
) {
    let update_id = update.id;
    match handler.dispatch(dptree::deps![bot, update, state]).await {
        ControlFlow::Break(Ok(())) => {}
        ControlFlow::Break(Err(e)) => error!("Error handling update {:?}: {:#}", update_id, e),
        ControlFlow::Continue(_) => debug!("Update {:?} not handled", update_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::RecipientKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_register_origin_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.json");
        let state = AppState::new(Arc::new(RecipientStore::load(path.clone())));

        let origin = Origin {
            chat: "-300".to_string(),
            kind: RecipientKind::Group,
            sender: "9".to_string(),
        };
        register_origin(origin, state.clone()).await;

        assert!(state.recipients.snapshot().groups.contains("-300"));
        assert!(RecipientStore::load(&path).snapshot().groups.contains("-300"));
    }
}
