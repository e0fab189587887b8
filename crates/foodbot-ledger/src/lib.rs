//! # FoodBot Ledger
//!
//! The source of truth for users, products, and intake reports.
//!
//! This crate provides:
//! - The [`Store`] interface and its SQLite implementation
//! - The [`Ledger`], a read-through user cache with day-bucketed history queries
//! - The [`ProductCatalog`], an in-process recall aid with a bounded recency cache

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod sqlite;
pub mod store;

pub use catalog::*;
pub use error::*;
pub use ledger::*;
pub use sqlite::*;
pub use store::*;
