use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use teloxide::types::ChatId;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// The one chat that receives every forwarded confession.
    pub admin_chat_id: ChatId,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Public base URL Telegram should push updates to. Polling is used when unset.
    pub url: Option<String>,
    pub port: u16,
}

/// How updates reach the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Polling,
    Webhook,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Polling => write!(f, "polling"),
            Transport::Webhook => write!(f, "webhook"),
        }
    }
}

// Loose file shape: every field optional so env vars can fill the gaps.
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    telegram: FileTelegram,
    #[serde(default)]
    webhook: FileWebhook,
}

#[derive(Debug, Deserialize, Default)]
struct FileTelegram {
    bot_token: Option<String>,
    admin_chat_id: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
struct FileWebhook {
    url: Option<String>,
    port: Option<u16>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load from an optional TOML file, then let the process environment override it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            None => FileConfig::default(),
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| non_blank(env(key));

        let bot_token = lookup("TELEGRAM_TOKEN")
            .or_else(|| non_blank(file.telegram.bot_token))
            .context("Missing required setting: TELEGRAM_TOKEN")?;

        let admin_chat_id = match lookup("ADMIN_CHAT_ID") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("ADMIN_CHAT_ID must be an integer chat id, got '{raw}'"))?,
            None => file
                .telegram
                .admin_chat_id
                .context("Missing required setting: ADMIN_CHAT_ID")?,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{raw}'"))?,
            None => file.webhook.port.unwrap_or(DEFAULT_PORT),
        };

        let url = lookup("WEBHOOK_URL")
            .or_else(|| non_blank(file.webhook.url))
            .map(|u| u.trim_end_matches('/').to_string());

        Ok(Config {
            telegram: TelegramConfig {
                bot_token,
                admin_chat_id: ChatId(admin_chat_id),
            },
            webhook: WebhookConfig { url, port },
        })
    }

    pub fn transport(&self) -> Transport {
        if self.webhook.url.is_some() {
            Transport::Webhook
        } else {
            Transport::Polling
        }
    }

    /// Route the webhook listens on. The token keeps the path unguessable.
    pub fn webhook_path(&self) -> String {
        format!("/bot{}", self.telegram.bot_token)
    }

    /// Full URL registered with Telegram, if webhook mode is configured.
    pub fn webhook_endpoint(&self) -> Option<String> {
        self.webhook
            .url
            .as_ref()
            .map(|base| format!("{}{}", base, self.webhook_path()))
    }
}
