use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::relay::{OutboundMessage, Plan};

/// Something that can put a text message into a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, message: &OutboundMessage) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to send.
    Skipped,
    Delivered,
    Failed { fallback_sent: bool },
}

/// Execute a plan. Errors are logged here and never returned.
pub async fn deliver(plan: &Plan, messenger: &dyn Messenger) -> Outcome {
    if plan.is_empty() {
        return Outcome::Skipped;
    }

    for message in &plan.sends {
        if let Err(e) = messenger.send_text(message).await {
            error!("Failed to send message to chat {}: {:#}", message.chat_id, e);

            let Some(fallback) = &plan.fallback else {
                return Outcome::Failed {
                    fallback_sent: false,
                };
            };

            let fallback_sent = match messenger.send_text(fallback).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "Failed to send error notice to chat {}: {:#}",
                        fallback.chat_id, e
                    );
                    false
                }
            };
            return Outcome::Failed { fallback_sent };
        }
    }

    debug!("Delivered {} message(s)", plan.sends.len());
    Outcome::Delivered
}


#[cfg(test)]
mod tests {
    use super::mock::RecordingMessenger;
    use super::*;
    use crate::config::TelegramConfig;
    use crate::platform::InboundMessage;
    use crate::relay::{self, APOLOGY};
    use teloxide::types::ChatId;

    const ADMIN: ChatId = ChatId(999);
    const SENDER: ChatId = ChatId(555);

    fn plan_for(text: Option<&str>, from: ChatId) -> Plan {
        let config = TelegramConfig {
            bot_token: "t".to_string(),
            admin_chat_id: ADMIN,
        };
        relay::handle(&InboundMessage::new(from, text.map(str::to_string)), &config)
    }

    #[tokio::test]
    async fn test_delivers_in_order() {
        let messenger = RecordingMessenger::default();
        let outcome = deliver(&plan_for(Some("I feel overwhelmed"), SENDER), &messenger).await;

        assert_eq!(outcome, Outcome::Delivered);
        let attempts = messenger.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].chat_id, ADMIN);
        assert_eq!(attempts[1].chat_id, SENDER);
    }

    #[tokio::test]
    async fn test_admin_message_makes_no_calls() {
        let messenger = RecordingMessenger::default();
        let outcome = deliver(&plan_for(Some("hi"), ADMIN), &messenger).await;

        assert_eq!(outcome, Outcome::Skipped);
        assert!(messenger.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_admin_failure_sends_apology_once() {
        let messenger = RecordingMessenger::failing_for(&[ADMIN]);
        let outcome = deliver(&plan_for(Some("secret"), SENDER), &messenger).await;

        assert_eq!(outcome, Outcome::Failed { fallback_sent: true });
        let attempts = messenger.attempts();
        // forward, then apology; the acknowledgment is never attempted
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].chat_id, ADMIN);
        assert_eq!(attempts[1].chat_id, SENDER);
        assert_eq!(attempts[1].text, APOLOGY);
    }

    #[tokio::test]
    async fn test_sender_failure_is_swallowed() {
        let messenger = RecordingMessenger::failing_for(&[SENDER]);
        let outcome = deliver(&plan_for(Some("secret"), SENDER), &messenger).await;

        assert_eq!(
            outcome,
            Outcome::Failed {
                fallback_sent: false
            }
        );
        // forward, acknowledgment, one apology attempt
        assert_eq!(messenger.attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_acknowledgment_failure_sends_apology() {
        // forward succeeds, acknowledgment fails, apology succeeds
        let messenger = RecordingMessenger::failing_on_attempts(&[1]);
        let outcome = deliver(&plan_for(Some("secret"), SENDER), &messenger).await;

        assert_eq!(outcome, Outcome::Failed { fallback_sent: true });
        let attempts = messenger.attempts();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0].chat_id, ADMIN);
        assert_eq!(attempts[1].chat_id, SENDER);
        assert_eq!(attempts[2].chat_id, SENDER);
        assert_eq!(attempts[2].text, APOLOGY);
    }

    #[tokio::test]
    async fn test_greeting_failure_has_no_fallback() {
        let messenger = RecordingMessenger::failing_for(&[SENDER]);
        let outcome = deliver(&plan_for(Some("/start"), SENDER), &messenger).await;

        assert_eq!(
            outcome,
            Outcome::Failed {
                fallback_sent: false
            }
        );
        assert_eq!(messenger.attempts().len(), 1);
    }
}
