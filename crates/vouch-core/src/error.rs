//! Error types for the Vouch core library
//!
//! Two kinds of failure leave the orchestrator: the schema could not be
//! compiled, or the data did not satisfy it. They stay distinct so callers
//! can tell a programming mistake from bad input.

use thiserror::Error;
use vouch_schemas::{CompileError, ValidationErrors};

/// Main error type for Vouch operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The schema is malformed or references unknown rules
    #[error("Schema compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// The data failed one or more rules
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the data, rather than the schema, was at fault
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the schema could not be compiled
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    /// Formatted failures, when validation failed
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Compile(_) => None,
        }
    }

    /// Compile fault, when the schema was rejected
    pub fn compile_error(&self) -> Option<&CompileError> {
        match self {
            Self::Compile(err) => Some(err),
            Self::Validation(_) => None,
        }
    }

    /// Consume into the formatted failures
    pub fn into_validation_errors(self) -> Option<ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Compile(_) => None,
        }
    }
}
