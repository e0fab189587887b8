//! Common type definitions and newtype wrappers for domain modeling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer identifying one local calendar day of a user.
///
/// See [`crate::day_bucket`] for how it is derived from a UTC instant.
pub type DayBucket = i64;

/// Stable identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user of the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier assigned by the store.
    pub id: UserId,
    /// Chat transport user name; unique.
    pub name: String,
    /// Daily calorie budget. Zero means the user has not set one yet.
    pub daily_limit_kcal: u32,
    /// Offset of the user's local time from UTC, in seconds.
    pub timezone_offset_seconds: i32,
}

/// A food the bot has been taught, with one energy value.
///
/// The same name may appear with several energy values (different brands),
/// but each `(name, kcal_per_100g)` pair is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    /// Normalized product name.
    pub name: String,
    /// Energy value in kcal per 100 grams.
    pub kcal_per_100g: u32,
}

impl Product {
    /// Creates a new product.
    pub fn new(name: impl Into<String>, kcal_per_100g: u32) -> Self {
        Self {
            name: name.into(),
            kcal_per_100g,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} kcal/100g)", self.name, self.kcal_per_100g)
    }
}

/// One intake event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// When the intake was started (the `/add` instant), in UTC.
    pub timestamp: DateTime<Utc>,
    /// Normalized product name.
    pub product_name: String,
    /// Energy value in kcal per 100 grams.
    pub kcal_per_100g: u32,
    /// Eaten amount in grams; positive for every stored report.
    pub grams: u32,
}

impl Report {
    /// Energy of this single entry, truncated on its own.
    ///
    /// This is the per-line figure shown next to each entry. Day totals
    /// truncate once after summing instead, so the lines of a day do not
    /// necessarily add up to the day total.
    pub fn line_kcal(&self) -> u64 {
        u64::from(self.kcal_per_100g) * u64::from(self.grams) / 100
    }

    /// The product this report refers to.
    pub fn product(&self) -> Product {
        Product::new(self.product_name.clone(), self.kcal_per_100g)
    }
}
