mod bot;
mod config;
mod delivery;
mod platform;
mod relay;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bot::AppState;
use crate::config::Config;

/// Explicit path from argv must exist; the default `config.toml` is optional.
fn config_path() -> Result<Option<PathBuf>> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) if path.exists() => Ok(Some(path)),
        Some(path) => bail!("Config file not found: {}", path.display()),
        None => {
            let default = PathBuf::from("config.toml");
            Ok(default.exists().then_some(default))
        }
    }
}

/// Loads `.env` first so it can supply `RUST_LOG` as well as the bot settings.
fn log_filter(dotenv_path: &Path) -> EnvFilter {
    dotenvy::from_path(dotenv_path).ok();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,ventbot=debug".into())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(log_filter(Path::new(".env")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = config_path()?;
    if let Some(path) = &config_path {
        info!("Loading configuration from: {}", path.display());
    }

    let config = Config::load(config_path.as_deref())
        .context("Missing or invalid configuration")?;

    info!("Configuration loaded successfully");
    info!("  Admin chat ID: {}", config.telegram.admin_chat_id);
    info!("  Transport: {}", config.transport());

    let bot = Bot::new(&config.telegram.bot_token);
    let state = Arc::new(AppState::new(config, Arc::new(bot.clone())));

    info!("Bot is starting...");
    bot::run(state, bot).await.context("Bot stopped with an error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_read_from_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "RUST_LOG=ventbot=trace\n").unwrap();
        std::env::remove_var("RUST_LOG");

        let filter = log_filter(&path);

        assert!(filter.to_string().contains("ventbot=trace"));
        std::env::remove_var("RUST_LOG");
    }
}
