use std::sync::Arc;

use anyhow::Result;
use teloxide::Bot;
use tracing::{debug, info, warn};

use crate::config::{Config, Transport};
use crate::delivery::{self, Messenger, Outcome};
use crate::platform::{self, InboundMessage};
use crate::relay::{self, Decision};

/// Shared application state
pub struct AppState {
    pub config: Config,
    messenger: Arc<dyn Messenger>,
}

impl AppState {
    pub fn new(config: Config, messenger: Arc<dyn Messenger>) -> Self {
        Self { config, messenger }
    }

    /// Relay one inbound message. Never fails; send errors are logged by delivery.
    pub async fn process(&self, message: &InboundMessage) -> Outcome {
        debug!("Received a message from chat ID: {}", message.chat_id);

        let plan = relay::handle(message, &self.config.telegram);
        if plan.decision == Decision::FromAdmin {
            debug!("Ignoring message from admin chat");
        }

        let outcome = delivery::deliver(&plan, self.messenger.as_ref()).await;
        match (plan.decision, outcome) {
            (Decision::Confession, Outcome::Delivered) => {
                info!("Message forwarded successfully");
            }
            (_, Outcome::Failed { fallback_sent }) => {
                warn!(
                    "Relay failed for chat {} (error notice sent: {})",
                    message.chat_id, fallback_sent
                );
            }
            _ => {}
        }
        outcome
    }
}

/// Start the bot on whichever transport the config selects
pub async fn run(state: Arc<AppState>, bot: Bot) -> Result<()> {
    match state.config.transport() {
        Transport::Polling => platform::telegram::run(state, bot).await,
        Transport::Webhook => platform::webhook::run(state, bot).await,
    }
}
