//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The schema could not be compiled
    #[error("Schema error: {0}")]
    Schema(#[from] vouch_core::CompileError),

    /// One or more data files failed validation
    #[error("{failed} of {total} file(s) failed validation")]
    ValidationFailed { failed: usize, total: usize },

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} ({})", path.display(), expected, reason)]
    InvalidFormat {
        path: PathBuf,
        expected: String,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl From<vouch_core::Error> for Error {
    fn from(err: vouch_core::Error) -> Self {
        match err {
            vouch_core::Error::Compile(compile) => Self::Schema(compile),
            vouch_core::Error::Validation(errors) => Self::ValidationFailed {
                failed: usize::from(!errors.is_empty()),
                total: 1,
            },
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationFailed { .. } => 1,
            Self::Schema(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::Io(_) => 7,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::CompileError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::ValidationFailed { failed: 1, total: 2 }.exit_code(), 1);
        assert_eq!(Error::from(CompileError::unknown_rule("a", "b")).exit_code(), 2);
        assert_eq!(Error::config("bad").exit_code(), 5);
        assert!(Error::invalid_args("x").should_show_help());
    }

    #[test]
    fn test_core_error_conversion() {
        let err = Error::from(vouch_core::Error::from(CompileError::invalid_schema("not an object")));
        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(err.to_string(), "Schema error: Invalid schema: not an object");
    }

    #[test]
    fn test_format_error_without_color() {
        let err = Error::FileNotFound {
            path: PathBuf::from("missing.json"),
        };
        assert_eq!(format_error(&err, false), "Error: File not found: missing.json");
    }
}
