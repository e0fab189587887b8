//! Application-wide error types using thiserror.

use foodbot_common::FoodbotError;
use foodbot_ledger::{LedgerError, StoreError};

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] FoodbotError),

    /// The ledger could not be opened.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The database could not be reached.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Telegram Bot API error.
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Logging could not be initialised.
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
