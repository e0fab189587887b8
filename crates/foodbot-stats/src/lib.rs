//! # FoodBot Stats
//!
//! Daily and weekly intake summaries for FoodBot users.
//!
//! The [`ReportAggregator`] composes ledger queries into numeric summaries;
//! the [`render`] module turns those summaries into Telegram MarkdownV2.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod render;

pub use aggregator::*;
pub use render::*;
