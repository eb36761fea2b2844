//! Fixed-time adhkar job.
//!
//! Twice a day, reads a plain-text file from the adhkar directory and pushes
//! it to the configured targets. Files are read at send time, so they can be
//! edited without a restart.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bot::outbox::{DeliveryReport, Outbox, push_all};
use crate::config::AdhkarConfig;

/// One of the two daily sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Morning,
    Evening,
}

impl Slot {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Morning => "morning.txt",
            Self::Evening => "evening.txt",
        }
    }
}

/// Next instant at or after `now` whose wall-clock time is `at`.
///
/// Times that do not exist on a given day (DST gaps) are skipped to the
/// following day; ambiguous ones use the earlier instant.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    for _ in 0..3 {
        if let Some(candidate) = tz.from_local_datetime(&day.and_time(at)).earliest()
            && candidate > *now
        {
            return Some(candidate);
        }
        day = day.succ_opt()?;
    }
    None
}

/// Sender for the morning and evening adhkar.
pub struct AdhkarJob {
    dir: PathBuf,
    slots: [(Slot, NaiveTime); 2],
    targets: Vec<String>,
    outbox: Arc<dyn Outbox>,
}

impl AdhkarJob {
    pub fn new(config: &AdhkarConfig, targets: Vec<String>, outbox: Arc<dyn Outbox>) -> Self {
        Self {
            dir: config.dir.clone(),
            slots: [
                (Slot::Morning, config.morning_at),
                (Slot::Evening, config.evening_at),
            ],
            targets,
            outbox,
        }
    }

    /// The slot that fires next after `now`, and when.
    pub fn next_slot<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<(Slot, DateTime<Tz>)> {
        self.slots
            .iter()
            .filter_map(|(slot, at)| next_occurrence(now, *at).map(|when| (*slot, when)))
            .min_by(|a, b| a.1.cmp(&b.1))
    }

    /// Run until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Adhkar job started ({} targets, dir {})",
            self.targets.len(),
            self.dir.display()
        );

        loop {
            let now = Local::now();
            let Some((slot, when)) = self.next_slot(&now) else {
                warn!("Could not compute next adhkar time, stopping job");
                return;
            };
            let wait = (when.clone() - now).to_std().unwrap_or_default();
            debug!("Next adhkar ({:?}) at {}", slot, when);

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Adhkar job shutting down");
                    return;
                }
                _ = tokio::time::sleep(wait) => {
                    self.send(slot).await;
                }
            }
        }
    }

    /// Read the slot's file and push it. `None` if nothing was sent.
    pub async fn send(&self, slot: Slot) -> Option<DeliveryReport> {
        let text = match read_text(&self.dir.join(slot.file_name())).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {:?} adhkar: {}", slot, e);
                return None;
            }
        };
        if text.is_empty() {
            warn!("Skipping {:?} adhkar: file is empty", slot);
            return None;
        }

        let report = push_all(self.outbox.as_ref(), &self.targets, &text).await;
        info!(
            "{:?} adhkar delivered to {}/{} targets",
            slot,
            report.delivered,
            report.attempted()
        );
        Some(report)
    }
}

async fn read_text(path: &Path) -> std::io::Result<String> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::outbox::testing::RecordingOutbox;
    use chrono::Utc;
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn job(dir: &TempDir, outbox: Arc<RecordingOutbox>) -> AdhkarJob {
        let config = AdhkarConfig {
            dir: dir.path().to_path_buf(),
            morning_at: at(5, 0),
            evening_at: at(17, 0),
        };
        AdhkarJob::new(&config, vec!["1".into(), "@channel".into()], outbox)
    }

    #[test]
    fn test_next_occurrence_same_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 4, 0, 0).unwrap();
        let next = next_occurrence(&now, at(5, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_next_occurrence_rolls_over() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap();
        let next = next_occurrence(&now, at(5, 0)).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 2, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_next_slot_picks_earliest() {
        let dir = TempDir::new().unwrap();
        let job = job(&dir, Arc::new(RecordingOutbox::default()));

        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let (slot, when) = job.next_slot(&noon).unwrap();
        assert_eq!(slot, Slot::Evening);
        assert_eq!(when, Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap());

        let night = Utc.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap();
        let (slot, when) = job.next_slot(&night).unwrap();
        assert_eq!(slot, Slot::Morning);
        assert_eq!(when, Utc.with_ymd_and_hms(2024, 3, 2, 5, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_send_pushes_trimmed_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("morning.txt"), "\n Morning adhkar \n").unwrap();
        let outbox = Arc::new(RecordingOutbox::default());
        let job = job(&dir, outbox.clone());

        let report = job.send(Slot::Morning).await.unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(
            outbox.sent(),
            vec![
                ("1".to_string(), "Morning adhkar".to_string()),
                ("@channel".to_string(), "Morning adhkar".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_skips_missing_or_empty_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("evening.txt"), "   \n").unwrap();
        let outbox = Arc::new(RecordingOutbox::default());
        let job = job(&dir, outbox.clone());

        assert!(job.send(Slot::Morning).await.is_none());
        assert!(job.send(Slot::Evening).await.is_none());
        assert!(outbox.sent().is_empty());
    }
}
