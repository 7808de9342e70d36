pub mod telegram;
pub mod webhook;

use teloxide::types::ChatId;

/// A message received from the platform, reduced to what the relay needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat the message came from; replies go back here
    pub chat_id: ChatId,
    /// The message text, absent for stickers, photos and the like
    pub text: Option<String>,
}

impl InboundMessage {
    pub fn new(chat_id: ChatId, text: Option<String>) -> Self {
        Self { chat_id, text }
    }
}
