//! Configuration schema definitions using serde.

use serde::{Deserialize, Serialize};

/// Main configuration structure for FoodBot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram configuration.
    pub telegram: TelegramConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Dialogue configuration.
    pub dialogue: DialogueConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Telegram bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token.
    pub token: String,
    /// Log every inbound update at debug level.
    pub debug: bool,
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file, or `:memory:`.
    pub path: String,
    /// Upper bound of pooled connections.
    pub max_connections: u32,
}

/// Dialogue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Capacity of the recency cache and number of quick choices on `/add`.
    pub recent_products: usize,
    /// UTC offset assigned to users registered through `/start`.
    pub default_timezone_offset_seconds: i32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "foodbot_dialogue=trace").
    pub level: String,
    /// Whether to emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Directory for daily-rolling log files; stdout when unset.
    pub directory: Option<String>,
}
