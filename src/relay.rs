//! Classification of inbound messages into the sends they should cause.
//!
//! Nothing here touches the network; transports feed messages in and hand
//! the resulting [`Plan`] to [`crate::delivery::deliver`].

use teloxide::types::ChatId;

use crate::config::TelegramConfig;
use crate::platform::InboundMessage;

pub const START_COMMAND: &str = "/start";

pub const GREETING: &str = "Hello! I am the anonymous vent bot. Send me a message and I will \
forward it to the admin anonymously. You can vent about anything here.";

pub const ACKNOWLEDGMENT: &str = "Thank you! Your confession has been sent anonymously.";

pub const APOLOGY: &str = "⚠️ Sorry, there was an error sending your message. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    /// Telegram's legacy Markdown: `*bold*`, `_italic_`
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub format: TextFormat,
}

impl OutboundMessage {
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: TextFormat::Plain,
        }
    }

    pub fn markdown(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: TextFormat::Markdown,
        }
    }
}

/// Why a message produced the sends it did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Decision {
    /// Sent by the admin chat itself.
    FromAdmin,
    /// No text, or empty text.
    #[default]
    NoText,
    Greeting,
    Confession,
}

/// Sends decided for one inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub decision: Decision,
    /// Sent in order; the first failure stops the rest.
    pub sends: Vec<OutboundMessage>,
    /// Sent once if any of `sends` fails.
    pub fallback: Option<OutboundMessage>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.sends.is_empty()
    }
}

/// Wrap a confession in the label the admin sees.
pub fn confession_text(text: &str) -> String {
    format!("🤫 *New Anonymous Confession*\n\n\"{}\"", text)
}

pub fn handle(message: &InboundMessage, config: &TelegramConfig) -> Plan {
    // The admin talking to the bot would otherwise be forwarded back to itself.
    if message.chat_id == config.admin_chat_id {
        return Plan {
            decision: Decision::FromAdmin,
            ..Plan::default()
        };
    }

    let text = match message.text.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Plan {
                decision: Decision::NoText,
                ..Plan::default()
            }
        }
    };

    if text == START_COMMAND {
        return Plan {
            decision: Decision::Greeting,
            sends: vec![OutboundMessage::plain(message.chat_id, GREETING)],
            fallback: None,
        };
    }

    Plan {
        decision: Decision::Confession,
        sends: vec![
            OutboundMessage::markdown(config.admin_chat_id, confession_text(text)),
            OutboundMessage::plain(message.chat_id, ACKNOWLEDGMENT),
        ],
        fallback: Some(OutboundMessage::plain(message.chat_id, APOLOGY)),
    }
}
