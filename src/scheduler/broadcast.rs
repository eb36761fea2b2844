//! Periodic broadcast job.
//!
//! Every interval, one random message from the pool goes to every known
//! recipient. Each tick is independent of per-recipient state.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::MessagePool;
use crate::bot::outbox::{DeliveryReport, Outbox, push_all};
use crate::database::RecipientStore;
use crate::utils::truncate;

/// Random-message broadcaster.
pub struct BroadcastJob {
    recipients: Arc<RecipientStore>,
    pool: Arc<MessagePool>,
    outbox: Arc<dyn Outbox>,
    period: Duration,
}

impl BroadcastJob {
    pub fn new(
        recipients: Arc<RecipientStore>,
        pool: Arc<MessagePool>,
        outbox: Arc<dyn Outbox>,
        period: Duration,
    ) -> Self {
        Self {
            recipients,
            pool,
            outbox,
            period,
        }
    }

    /// Run until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!("Broadcast job started (every {}s)", self.period.as_secs());

        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the first
        // broadcast happens one full period after startup.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Broadcast job shutting down");
                    break;
                }
                _ = timer.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Single broadcast. `None` when there is nobody to send to.
    pub async fn tick(&self) -> Option<DeliveryReport> {
        let targets = self.recipients.all_targets();
        if targets.is_empty() {
            debug!("No recipients, skipping broadcast");
            return None;
        }

        // The rng is not Send, so keep it out of the await below.
        let (category, message) = {
            let mut rng = rand::rng();
            let (category, message) = self.pool.choose(&mut rng)?;
            (category.to_string(), message.to_string())
        };

        debug!(
            "Broadcasting [{}] \"{}\" to {} recipients",
            category,
            truncate(&message, 30),
            targets.len()
        );

        let report = push_all(self.outbox.as_ref(), &targets, &message).await;
        info!(
            "Broadcast [{}] delivered to {}/{} recipients",
            category,
            report.delivered,
            report.attempted()
        );
        Some(report)
    }
}
