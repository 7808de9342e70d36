use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, UpdateKind};
use tracing::{info, warn};

use crate::bot::AppState;
use crate::delivery::Messenger;
use crate::platform::InboundMessage;
use crate::relay::{OutboundMessage, TextFormat};

#[allow(deprecated)]
fn parse_mode(format: TextFormat) -> Option<ParseMode> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Markdown => Some(ParseMode::Markdown),
    }
}

#[async_trait]
impl Messenger for Bot {
    async fn send_text(&self, message: &OutboundMessage) -> Result<()> {
        let mut request = self.send_message(message.chat_id, message.text.clone());
        if let Some(mode) = parse_mode(message.format) {
            request = request.parse_mode(mode);
        }
        request
            .await
            .with_context(|| format!("sendMessage to chat {} failed", message.chat_id))?;
        Ok(())
    }
}

impl From<&Message> for InboundMessage {
    fn from(msg: &Message) -> Self {
        InboundMessage::new(msg.chat.id, msg.text().map(str::to_string))
    }
}

/// Pull the relay-relevant message out of an update, if it carries one
pub fn inbound_from_update(update: &Update) -> Option<InboundMessage> {
    match &update.kind {
        UpdateKind::Message(msg) => Some(InboundMessage::from(msg)),
        _ => None,
    }
}

/// Run the bot against Telegram's long-poll update feed
pub async fn run(state: Arc<AppState>, bot: Bot) -> Result<()> {
    // A registered webhook makes getUpdates fail, so clear any left over.
    if let Err(e) = bot.delete_webhook().await {
        warn!("Failed to delete webhook (might not exist): {}", e);
    }

    info!("Starting Telegram bot in polling mode...");

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("relay"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    state.process(&InboundMessage::from(&msg)).await;
    Ok(())
}
