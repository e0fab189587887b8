//! Default values for every configuration section.

use crate::schema::{Config, DatabaseConfig, DialogueConfig, LoggingConfig, TelegramConfig};

/// Default SQLite database path.
pub const DEFAULT_DATABASE_PATH: &str = "foodbot.db";

/// Default number of recently used products offered on `/add`.
pub const DEFAULT_RECENT_PRODUCTS: usize = 5;

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            database: DatabaseConfig::default(),
            dialogue: DialogueConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            debug: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATABASE_PATH.to_string(),
            max_connections: 4,
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            recent_products: DEFAULT_RECENT_PRODUCTS,
            default_timezone_offset_seconds: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}
