//! Dialogue states of one user.

use chrono::{DateTime, Utc};

/// Where a user is in the conversation.
///
/// The partially filled report lives inside the variants, so a state can
/// never carry fields that do not belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogueState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Waiting for a daily limit in kcal.
    AwaitingLimit,
    /// Waiting for the product name of an `/add` started at `started_at`.
    AwaitingProduct {
        /// The `/add` instant; becomes the report timestamp.
        started_at: DateTime<Utc>,
    },
    /// Waiting for the energy value of `product`.
    AwaitingKcal {
        /// The `/add` instant.
        started_at: DateTime<Utc>,
        /// Normalized product name.
        product: String,
    },
    /// Waiting for the eaten amount.
    AwaitingGrams {
        /// The `/add` instant.
        started_at: DateTime<Utc>,
        /// Normalized product name.
        product: String,
        /// Energy value in kcal per 100 grams.
        kcal_per_100g: u32,
    },
}

impl DialogueState {
    /// Short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingLimit => "awaiting_limit",
            Self::AwaitingProduct { .. } => "awaiting_product",
            Self::AwaitingKcal { .. } => "awaiting_kcal",
            Self::AwaitingGrams { .. } => "awaiting_grams",
        }
    }

    /// Whether nothing is in progress.
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a food entry is in progress.
    pub const fn is_adding_food(&self) -> bool {
        matches!(
            self,
            Self::AwaitingProduct { .. } | Self::AwaitingKcal { .. } | Self::AwaitingGrams { .. }
        )
    }
}
