//! # FoodBot
//!
//! Telegram bot for tracking daily calorie intake against a personal limit.
//!
//! This is the main binary crate: it loads configuration, initialises
//! logging, opens the SQLite ledger and binds the dialogue controller to
//! Telegram through teloxide.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod cli;
pub mod error;
pub mod logging;
pub mod telegram;

pub use bot::*;
pub use cli::*;
pub use error::*;
pub use logging::*;
pub use telegram::*;
