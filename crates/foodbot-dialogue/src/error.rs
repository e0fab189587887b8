//! Dialogue errors and the replies they produce.

use crate::reply::Reply;
use crate::selection::SelectionError;
use foodbot_ledger::LedgerError;
use thiserror::Error;

/// Result type alias for dialogue operations
pub type DialogueResult<T> = std::result::Result<T, DialogueError>;

/// Reply shown when the user's message does not fit the conversation.
pub const NOT_UNDERSTOOD: &str = "I don't understand you";

/// Errors raised while handling a message.
///
/// None of them changes the user's dialogue state.
#[derive(Error, Debug)]
pub enum DialogueError {
    /// The sender is not registered
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A number was expected
    #[error("Invalid numeric input {input:?}: expected {expected}")]
    InvalidNumericInput {
        /// The rejected text, trimmed
        input: String,
        /// What would have been accepted
        expected: &'static str,
        /// Prompt repeated to the user
        prompt: String,
    },

    /// Text that is not a command while idle
    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),

    /// Product text that normalizes to nothing
    #[error("Empty product name")]
    EmptyProductName,

    /// Inline choice payload failed validation
    #[error("Malformed selection: {0}")]
    MalformedSelection(#[source] SelectionError),

    /// Valid inline choice outside the product or kcal step
    #[error("Selection received outside of a food entry")]
    UnexpectedSelection,

    /// The ledger failed to store a change
    #[error("Persistence failure: {0}")]
    Persistence(#[source] LedgerError),
}

impl From<LedgerError> for DialogueError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserNotFound(name) => Self::UserNotFound(name),
            other => Self::Persistence(other),
        }
    }
}

impl From<SelectionError> for DialogueError {
    fn from(err: SelectionError) -> Self {
        Self::MalformedSelection(err)
    }
}

impl DialogueError {
    /// Invalid input where any integer would do.
    pub fn not_an_integer(input: &str, prompt: impl Into<String>) -> Self {
        Self::InvalidNumericInput {
            input: input.trim().to_string(),
            expected: "an integer",
            prompt: prompt.into(),
        }
    }

    /// Invalid input where an integer above zero is required.
    pub fn not_positive(input: &str, prompt: impl Into<String>) -> Self {
        Self::InvalidNumericInput {
            input: input.trim().to_string(),
            expected: "a positive integer",
            prompt: prompt.into(),
        }
    }

    /// A number outside the accepted range.
    pub fn out_of_range(input: &str, expected: &'static str, prompt: impl Into<String>) -> Self {
        Self::InvalidNumericInput {
            input: input.trim().to_string(),
            expected,
            prompt: prompt.into(),
        }
    }

    /// What the user is told.
    pub fn reply(&self) -> Reply {
        match self {
            Self::UserNotFound(_) => {
                Reply::plain("You aren't a user of this bot. Send /start to register.")
            }
            Self::InvalidNumericInput {
                input,
                expected,
                prompt,
            } => Reply::plain(format!("{input:?} is not {expected}. {prompt}")),
            Self::UnrecognizedCommand(_) | Self::UnexpectedSelection => Reply::plain(NOT_UNDERSTOOD),
            Self::EmptyProductName => {
                Reply::plain("Tell me the name of the product you have eaten.")
            }
            Self::MalformedSelection(_) => {
                Reply::plain("I can't read that choice. Please type the product instead.")
            }
            Self::Persistence(_) => Reply::plain("Something went wrong. Try again later."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_reply_quotes_input() {
        let error = DialogueError::not_an_integer(" 12.5 ", "Enter your daily limit (kcal)");
        assert_eq!(
            error.reply().text,
            "\"12.5\" is not an integer. Enter your daily limit (kcal)"
        );
        assert!(!error.reply().structured);
    }

    #[test]
    fn test_not_positive_reply() {
        let error = DialogueError::not_positive("0", "Enter how many grams you've eaten");
        assert_eq!(
            error.reply().text,
            "\"0\" is not a positive integer. Enter how many grams you've eaten"
        );
    }

    #[test]
    fn test_out_of_range_reply() {
        let error = DialogueError::out_of_range(
            "100001",
            "a positive integer up to 100000",
            "Enter how many grams you've eaten",
        );
        assert!(matches!(
            &error,
            DialogueError::InvalidNumericInput { input, .. } if input == "100001"
        ));
        assert_eq!(
            error.reply().text,
            "\"100001\" is not a positive integer up to 100000. Enter how many grams you've eaten"
        );
    }

    #[test]
    fn test_ledger_errors_map_to_dialogue_errors() {
        let missing: DialogueError = LedgerError::UserNotFound("bob".to_string()).into();
        assert!(matches!(missing, DialogueError::UserNotFound(name) if name == "bob"));

        let failed: DialogueError = LedgerError::persistence(
            "save report",
            foodbot_ledger::StoreError::invalid_row("reports", "broken"),
        )
        .into();
        assert!(matches!(failed, DialogueError::Persistence(_)));
        assert_eq!(failed.reply().text, "Something went wrong. Try again later.");
    }
}
