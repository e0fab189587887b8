//! Error types for the ledger and its store.

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Failures raised by a [`crate::Store`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database driver reported an error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped onto a value type
    #[error("Invalid row in {table}: {message}")]
    InvalidRow {
        /// Table the row came from
        table: &'static str,
        /// What was wrong with it
        message: String,
    },
}

impl StoreError {
    /// Create an invalid row error
    pub fn invalid_row(table: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRow {
            table,
            message: message.into(),
        }
    }
}

/// Errors surfaced by the [`crate::Ledger`].
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No user with this name is registered
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A write to the store failed
    #[error("Failed to {operation}: {source}")]
    Persistence {
        /// The write that was attempted
        operation: &'static str,
        /// Store failure behind it
        #[source]
        source: StoreError,
    },

    /// The store could not be opened or its initial contents loaded
    #[error("Failed to open ledger: {0}")]
    Startup(#[source] StoreError),
}

impl LedgerError {
    /// Create a persistence error for the named operation
    pub const fn persistence(operation: &'static str, source: StoreError) -> Self {
        Self::Persistence { operation, source }
    }

    /// Whether this error means the user is not registered
    pub const fn is_user_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_display() {
        let error = LedgerError::persistence(
            "save report",
            StoreError::invalid_row("reports", "negative grams"),
        );
        assert_eq!(
            error.to_string(),
            "Failed to save report: Invalid row in reports: negative grams"
        );
        assert!(!error.is_user_not_found());
    }

    #[test]
    fn test_user_not_found() {
        let error = LedgerError::UserNotFound("bob".to_string());
        assert!(error.is_user_not_found());
        assert_eq!(error.to_string(), "User not found: bob");
    }
}
