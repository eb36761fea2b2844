//! Bot runtime - webhook server plus scheduled jobs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::dispatcher::{self, AppState, ThrottledBot};
use super::outbox::Outbox;
use super::webhook::{self, WebhookState};
use crate::config::Config;
use crate::scheduler::{AdhkarJob, BroadcastJob, MessagePool};

/// Run the bot until Ctrl+C.
///
/// Starts the broadcast job, the adhkar job (when configured) and the
/// webhook server, then waits for all of them to stop.
pub async fn run(
    config: &Config,
    bot: ThrottledBot,
    state: AppState,
    pool: Arc<MessagePool>,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let outbox: Arc<dyn Outbox> = Arc::new(bot.clone());

    register_webhook(config, &bot).await?;

    let broadcast = BroadcastJob::new(
        state.recipients.clone(),
        pool,
        outbox.clone(),
        config.broadcast_interval,
    );
    let broadcast_handle = tokio::spawn(broadcast.run(cancel.clone()));

    let adhkar_handle = match &config.adhkar {
        Some(adhkar) if !config.push_targets.is_empty() => {
            let job = AdhkarJob::new(adhkar, config.push_targets.clone(), outbox.clone());
            Some(tokio::spawn(job.run(cancel.clone())))
        }
        Some(_) => {
            info!("Adhkar job disabled: PUSH_TARGETS is empty");
            None
        }
        None => {
            info!("Adhkar job disabled: ADHKAR_DIR is not set");
            None
        }
    };

    let webhook_state = WebhookState {
        bot: bot.clone(),
        app: state.clone(),
        handler: dispatcher::schema(),
        secret: config.webhook_secret.clone(),
    };
    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let mut server_handle = tokio::spawn(webhook::serve(address, webhook_state, cancel.clone()));

    let server_result = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            cancel.cancel();
            server_handle.await
        }
        result = &mut server_handle => {
            // The server only stops on its own when it fails.
            cancel.cancel();
            result
        }
    };

    match server_result {
        Ok(Err(e)) => error!("Webhook server failed: {:#}", e),
        Err(e) => error!("Webhook server task panicked: {}", e),
        Ok(Ok(())) => {}
    }
    let _ = broadcast_handle.await;
    if let Some(handle) = adhkar_handle {
        let _ = handle.await;
    }

    if config.webhook_url.is_some()
        && let Err(e) = bot.delete_webhook().await
    {
        warn!("Failed to delete webhook: {}", e);
    }

    if let Err(e) = state.recipients.persist() {
        warn!("Failed to save recipients on shutdown: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Point Telegram at our webhook when a public URL is configured.
async fn register_webhook(config: &Config, bot: &ThrottledBot) -> anyhow::Result<()> {
    let Some(url) = config.webhook_url.clone() else {
        info!("WEBHOOK_URL not set, assuming the webhook is registered externally");
        return Ok(());
    };

    info!("🔗 Setting webhook URL: {}", url);
    let mut request = bot.set_webhook(url);
    if let Some(secret) = &config.webhook_secret {
        request = request.secret_token(secret.clone());
        info!("Webhook secret token configured");
    }
    request.await.context("Failed to set webhook")?;

    Ok(())
}
