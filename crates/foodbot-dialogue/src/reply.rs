//! Replies handed back to the transport.

/// An inline button offered with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickChoice {
    /// Button text.
    pub label: String,
    /// Encoded [`crate::Selection`] sent back when the button is pressed.
    pub payload: String,
}

/// Text to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Message body.
    pub text: String,
    /// Whether `text` is MarkdownV2.
    pub structured: bool,
    /// Inline buttons, one per row.
    pub choices: Vec<QuickChoice>,
}

impl Reply {
    /// Plain text reply.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: false,
            choices: Vec::new(),
        }
    }

    /// MarkdownV2 reply.
    pub fn structured(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: true,
            choices: Vec::new(),
        }
    }

    /// Attaches inline buttons.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<QuickChoice>) -> Self {
        self.choices = choices;
        self
    }
}
