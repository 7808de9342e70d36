//! Push transport: Telegram POSTs each update to `/bot<token>`.
//!
//! The endpoint always answers 200, right away, so Telegram never redelivers
//! an update: not one we could not parse, not one whose sends are slow.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use teloxide::prelude::*;
use tracing::{debug, info, warn};

use crate::bot::AppState;
use crate::platform::telegram::inbound_from_update;

pub const HEALTH_TEXT: &str = "✅ Anonymous vent bot is running.";

async fn health() -> &'static str {
    HEALTH_TEXT
}

async fn receive_update(State(state): State<Arc<AppState>>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Ignoring malformed update payload: {}", e);
            return StatusCode::OK;
        }
    };

    match inbound_from_update(&update) {
        Some(message) => {
            tokio::spawn(async move {
                state.process(&message).await;
            });
        }
        None => debug!("Ignoring non-message update {:?}", update.id),
    }

    StatusCode::OK
}

pub fn router(state: Arc<AppState>) -> Router {
    let path = state.config.webhook_path();
    Router::new()
        .route("/", get(health))
        .route(&path, post(receive_update))
        .with_state(state)
}

/// Register the webhook with Telegram and serve it until Ctrl-C
pub async fn run(state: Arc<AppState>, bot: Bot) -> Result<()> {
    let endpoint = state
        .config
        .webhook_endpoint()
        .context("Webhook mode requires WEBHOOK_URL")?;
    let url = reqwest::Url::parse(&endpoint).context("WEBHOOK_URL is not a valid URL")?;

    bot.set_webhook(url)
        .await
        .context("Failed to register webhook with Telegram")?;

    let addr = format!("0.0.0.0:{}", state.config.webhook.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Starting Telegram bot in webhook mode on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down webhook server");
        })
        .await
        .context("Webhook server error")?;

    Ok(())
}
