//! Configuration module for the tasbih bot.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use url::Url;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("BROADCAST_INTERVAL_SECS must be greater than zero")]
    ZeroInterval,
}

/// Fixed-time adhkar settings.
#[derive(Debug, Clone)]
pub struct AdhkarConfig {
    /// Directory holding `morning.txt` and `evening.txt`.
    pub dir: PathBuf,
    pub morning_at: NaiveTime,
    pub evening_at: NaiveTime,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,

    /// Public URL registered with `setWebhook` on startup.
    /// When unset, the webhook is assumed to be registered externally.
    pub webhook_url: Option<Url>,

    /// Expected value of the `X-Telegram-Bot-Api-Secret-Token` header.
    pub webhook_secret: Option<String>,

    pub port: u16,

    // Storage
    pub recipients_path: PathBuf,
    pub messages_path: PathBuf,

    // Scheduler
    pub broadcast_interval: Duration,

    /// Identifiers that receive fixed-time adhkar (comma-separated).
    pub push_targets: Vec<String>,

    /// `None` when `ADHKAR_DIR` is not set.
    pub adhkar: Option<AdhkarConfig>,
}

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_BROADCAST_INTERVAL_SECS: u64 = 300;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let bot_token = env::var("BOT_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        let webhook_url = match optional("WEBHOOK_URL") {
            Some(raw) => Some(Url::parse(&raw).map_err(|_| ConfigError::InvalidValue {
                var: "WEBHOOK_URL",
                value: raw,
            })?),
            None => None,
        };

        let port = match optional("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let interval_secs: u64 = match optional("BROADCAST_INTERVAL_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "BROADCAST_INTERVAL_SECS",
                value: raw,
            })?,
            None => DEFAULT_BROADCAST_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let adhkar = match optional("ADHKAR_DIR") {
            Some(dir) => Some(AdhkarConfig {
                dir: PathBuf::from(dir),
                morning_at: time_var("ADHKAR_MORNING_AT", "05:00")?,
                evening_at: time_var("ADHKAR_EVENING_AT", "17:00")?,
            }),
            None => None,
        };

        Ok(Self {
            bot_token,
            webhook_url,
            webhook_secret: optional("WEBHOOK_SECRET"),
            port,
            recipients_path: optional("RECIPIENTS_PATH")
                .map_or_else(|| PathBuf::from("recipients.json"), PathBuf::from),
            messages_path: optional("MESSAGES_PATH")
                .map_or_else(|| PathBuf::from("messages.json"), PathBuf::from),
            broadcast_interval: Duration::from_secs(interval_secs),
            push_targets: parse_targets(&env::var("PUSH_TARGETS").unwrap_or_default()),
            adhkar,
        })
    }
}

/// Read a variable, treating blank values as unset.
fn optional(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn time_var(var: &'static str, default: &str) -> Result<NaiveTime, ConfigError> {
    let raw = optional(var).unwrap_or_else(|| default.to_string());
    parse_time(&raw).ok_or(ConfigError::InvalidValue { var, value: raw })
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Split a comma-separated target list, dropping blanks and duplicates.
pub fn parse_targets(raw: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for target in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        let targets = parse_targets(" -100123, 42,,@channel ,42");
        assert_eq!(targets, vec!["-100123", "42", "@channel"]);
    }

    #[test]
    fn test_parse_targets_empty() {
        assert!(parse_targets("").is_empty());
        assert!(parse_targets(" , ").is_empty());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("05:00"), NaiveTime::from_hms_opt(5, 0, 0));
        assert_eq!(parse_time("17:30:15"), NaiveTime::from_hms_opt(17, 30, 15));
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("morning"), None);
    }
}
