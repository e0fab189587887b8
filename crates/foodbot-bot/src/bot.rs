//! Application assembly: store, dialogue controller and transport.

use crate::error::BotResult;
use crate::telegram::{self, Transport};
use foodbot_config::Config;
use foodbot_dialogue::{DialogueController, DialogueSettings};
use foodbot_ledger::SqliteStore;
use std::sync::Arc;
use teloxide::Bot;
use tracing::info;

/// Main bot structure.
#[derive(Debug)]
pub struct FoodBot {
    config: Config,
    controller: Arc<DialogueController>,
}

impl FoodBot {
    /// Opens the database and rebuilds in-memory state from it.
    ///
    /// Fails when the store cannot be opened; the bot never runs without
    /// its ledger.
    pub async fn new(config: Config) -> BotResult<Self> {
        let store = SqliteStore::connect(
            &config.database.path,
            config.database.max_connections,
        )
        .await?;
        info!(path = %config.database.path, "Opened database");

        let controller =
            DialogueController::bootstrap(Arc::new(store), dialogue_settings(&config)).await?;

        Ok(Self {
            config,
            controller: Arc::new(controller),
        })
    }

    /// The dialogue controller serving all users.
    pub const fn controller(&self) -> &Arc<DialogueController> {
        &self.controller
    }

    /// Connects to Telegram and serves updates until interrupted.
    pub async fn start(self) -> BotResult<()> {
        let bot = Bot::new(&self.config.telegram.token);
        let transport = Transport::new(self.controller, self.config.telegram.debug);

        telegram::run(bot, transport).await
    }
}

/// Dialogue tunables taken from the configuration.
pub fn dialogue_settings(config: &Config) -> DialogueSettings {
    DialogueSettings {
        recent_products: config.dialogue.recent_products,
        default_timezone_offset_seconds: config.dialogue.default_timezone_offset_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_settings_follow_config() {
        let mut config = Config::default();
        config.dialogue.recent_products = 3;
        config.dialogue.default_timezone_offset_seconds = 3 * 3600;

        let settings = dialogue_settings(&config);
        assert_eq!(settings.recent_products, 3);
        assert_eq!(settings.default_timezone_offset_seconds, 3 * 3600);
    }

    #[test]
    fn test_new_bot_starts_with_empty_catalog() {
        let mut config = Config::default();
        config.database.path = ":memory:".to_string();

        let bot = tokio_test::block_on(FoodBot::new(config)).unwrap();
        assert!(bot.controller().catalog().is_empty());
    }
}
