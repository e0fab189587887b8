//! Runtime validation of a loaded configuration.

use crate::schema::Config;
use foodbot_common::FoodbotError;

/// Largest UTC offset used by any real timezone (UTC+14).
pub const MAX_TIMEZONE_OFFSET_SECONDS: i32 = 14 * 3600;

/// Largest supported recency cache.
pub const MAX_RECENT_PRODUCTS: usize = 10;

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), FoodbotError> {
        if self.telegram.token.trim().is_empty() {
            return Err(FoodbotError::validation_field(
                "Telegram token cannot be empty",
                "telegram.token",
            ));
        }

        if self.database.path.trim().is_empty() {
            return Err(FoodbotError::validation_field(
                "Database path cannot be empty",
                "database.path",
            ));
        }

        if self.database.max_connections == 0 {
            return Err(FoodbotError::validation_field(
                "At least one database connection is required",
                "database.max_connections",
            ));
        }

        if !(1..=MAX_RECENT_PRODUCTS).contains(&self.dialogue.recent_products) {
            return Err(FoodbotError::validation_field(
                format!("recent_products must be between 1 and {MAX_RECENT_PRODUCTS}"),
                "dialogue.recent_products",
            ));
        }

        if self.dialogue.default_timezone_offset_seconds.abs() > MAX_TIMEZONE_OFFSET_SECONDS {
            return Err(FoodbotError::validation_field(
                "Timezone offset must lie within ±14 hours",
                "dialogue.default_timezone_offset_seconds",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(FoodbotError::validation_field(
                "Log level cannot be empty",
                "logging.level",
            ));
        }

        Ok(())
    }

    /// Whether the database lives only in memory for the life of the process.
    pub fn is_in_memory_database(&self) -> bool {
        self.database.path == ":memory:"
    }
}
