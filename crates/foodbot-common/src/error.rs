//! Error types and utilities for FoodBot

use thiserror::Error;

/// Result type alias for FoodBot operations
pub type Result<T> = std::result::Result<T, FoodbotError>;

/// Main error type for FoodBot operations
#[derive(Error, Debug)]
pub enum FoodbotError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the problem
        message: String,
        /// Offending field, if known
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        /// Description of the problem
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FoodbotError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Name of the offending field, for validation errors that carry one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let error = FoodbotError::new("test message");
        assert!(error.to_string().contains("test message"));

        let config_error = FoodbotError::config("config issue");
        assert_eq!(config_error.to_string(), "Configuration error: config issue");

        let validation_error = FoodbotError::validation_field("must be positive", "max_connections");
        assert_eq!(validation_error.to_string(), "Validation error: must be positive");
        assert_eq!(validation_error.field(), Some("max_connections"));
        assert_eq!(FoodbotError::validation("plain").field(), None);
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = FoodbotError::with_source("Failed to read file", io_error);

        assert!(wrapped_error.to_string().contains("Failed to read file"));
        assert!(wrapped_error.source().is_some());

        let config_source_error = FoodbotError::config_with_source(
            "Config loading failed",
            io::Error::new(io::ErrorKind::PermissionDenied, "Access denied"),
        );
        assert!(config_source_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: FoodbotError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error: FoodbotError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }
}
