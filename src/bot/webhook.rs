//! Webhook server.
//!
//! Receives Telegram updates over HTTP with axum:
//! - `POST /webhook` verifies the secret token header, then dispatches the
//!   update on a background task
//! - `GET /health` for liveness checks
//!
//! The webhook always answers `200 OK`, even for rejected or malformed
//! requests, so Telegram never retries a delivery.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::dispatcher::{self, AppState, ThrottledBot};

/// Header Telegram uses to echo the secret given to `setWebhook`.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub const WEBHOOK_PATH: &str = "/webhook";

/// Everything the webhook route needs.
#[derive(Clone)]
pub struct WebhookState {
    pub bot: ThrottledBot,
    pub app: AppState,
    pub handler: UpdateHandler<anyhow::Error>,
    pub secret: Option<String>,
}

impl WebhookState {
    /// Check the secret token header. Always passes when no secret is set.
    pub fn verify(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.secret.as_deref() else {
            return true;
        };
        headers
            .get(SECRET_HEADER)
            .is_some_and(|value| value.as_bytes() == expected.as_bytes())
    }

    /// Dispatch a parsed update to completion.
    pub async fn process(&self, update: Update) {
        dispatcher::dispatch(&self.handler, self.bot.clone(), update, self.app.clone()).await;
    }
}

/// Build the axum router.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(receive_update))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Accept one update. Always returns 200.
pub async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !state.verify(&headers) {
        warn!("Rejected webhook request with invalid secret token");
        return StatusCode::OK;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Ignoring malformed update: {}", e);
            return StatusCode::OK;
        }
    };

    // Reply after acknowledging, so slow sends never hold up Telegram.
    tokio::spawn(async move { state.process(update).await });

    StatusCode::OK
}

/// Serve the webhook until `cancel` fires.
pub async fn serve(
    address: SocketAddr,
    state: WebhookState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("📡 Listening on: {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("Webhook server stopped");
    Ok(())
}
