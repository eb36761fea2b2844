//! Tasbih Bot - Telegram tasbih counter and broadcaster
//!
//! Replies to tasbih phrases with per-user counts, filters link spam, and
//! pushes scheduled messages to every chat it knows.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - JSON-file recipient store
//! - `bot` - Webhook server, dispatcher and delivery (with Throttle for API rate limiting)
//! - `plugins` - Text command handlers (help, tasbih counters)
//! - `events` - Message event handlers (link spam filter)
//! - `scheduler` - Broadcast and adhkar jobs
//! - `utils` - Utility functions

mod bot;
mod config;
mod database;
mod events;
mod plugins;
mod scheduler;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::AppState;
use config::Config;
use database::RecipientStore;
use scheduler::MessagePool;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tasbih_bot=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting tasbih bot...");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    // A missing or broken pool is fatal: the broadcast job has nothing to send.
    let pool = MessagePool::load(&config.messages_path).with_context(|| {
        format!("Failed to load message pool from {}", config.messages_path.display())
    })?;
    info!(
        "Message pool loaded: {} messages in [{}]",
        pool.len(),
        pool.categories().collect::<Vec<_>>().join(", ")
    );

    let recipients = Arc::new(RecipientStore::load(config.recipients_path.clone()));
    let snapshot = recipients.snapshot();
    info!(
        "Recipients loaded from {}: {} groups, {} users",
        recipients.path().display(),
        snapshot.groups.len(),
        snapshot.users.len()
    );

    // Throttle respects Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    // - 20 messages per minute to the same group
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await.context("Failed to reach Telegram")?;
    info!("Bot username: @{}", me.username());

    let state = AppState::new(recipients);

    bot::run(&config, bot, state, Arc::new(pool)).await
}
