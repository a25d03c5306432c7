//! Error types for instance loading, model construction and solving.

use thiserror::Error;

/// Errors that can occur while turning an instance into a solved assignment.
///
/// A solve that finishes without proving optimality is not an error; it is
/// reported through [`crate::SolveOutcome::NotOptimal`].
#[derive(Error, Debug)]
pub enum CflpError {
    /// Input text did not match the instance format
    #[error("Malformed instance at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A solver setting is out of the engine's accepted range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A variable lookup fell outside the model dimensions
    #[error("Variable {variable} out of range (facilities={facility_count}, customers={customer_count})")]
    VariableOutOfRange {
        variable: String,
        facility_count: usize,
        customer_count: usize,
    },

    /// The engine returned a value vector that does not fit the model
    #[error("Solution has {actual} values, model has {expected} columns")]
    SolutionSize { expected: usize, actual: usize },

    /// The MILP engine failed before producing a status
    #[error("Engine failure: {0}")]
    Engine(String),
}

impl CflpError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        CflpError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type for CFLP operations.
pub type CflpResult<T> = Result<T, CflpError>;
