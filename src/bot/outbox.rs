//! Outbound delivery.
//!
//! Scheduled jobs push through [`Outbox`] so they can be driven by a
//! recording double in tests.

use async_trait::async_trait;
use futures::future::join_all;
use teloxide::prelude::*;
use tracing::warn;

use super::dispatcher::ThrottledBot;
use crate::utils::parse_recipient;

/// Push-to-identifier delivery.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn push(&self, target: &str, text: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl Outbox for ThrottledBot {
    async fn push(&self, target: &str, text: &str) -> anyhow::Result<()> {
        self.send_message(parse_recipient(target), text).await?;
        Ok(())
    }
}

/// Outcome of pushing one message to many targets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// `(target, error)` for every failed push.
    pub failed: Vec<(String, String)>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

/// Push `text` to every target concurrently.
///
/// Each failure is logged and recorded; none stops the others.
pub async fn push_all(outbox: &dyn Outbox, targets: &[String], text: &str) -> DeliveryReport {
    let results = join_all(targets.iter().map(|t| outbox.push(t, text))).await;

    let mut report = DeliveryReport::default();
    for (target, result) in targets.iter().zip(results) {
        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!("Failed to push to {}: {}", target, e);
                report.failed.push((target.clone(), e.to_string()));
            }
        }
    }
    report
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Records every push; targets listed in `failing` return an error.
    #[derive(Default)]
    pub struct RecordingOutbox {
        pub sent: Mutex<Vec<(String, String)>>,
        pub failing: Vec<String>,
    }

    impl RecordingOutbox {
        pub fn failing(targets: &[&str]) -> Self {
            Self {
                sent: Mutex::default(),
                failing: targets.iter().map(|t| t.to_string()).collect(),
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl Outbox for RecordingOutbox {
        async fn push(&self, target: &str, text: &str) -> anyhow::Result<()> {
            self.sent.lock().push((target.to_string(), text.to_string()));
            if self.failing.iter().any(|t| t == target) {
                anyhow::bail!("chat not found");
            }
            Ok(())
        }
    }
}
