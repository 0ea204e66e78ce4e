//! Error types for the simulation model.

use thiserror::Error;

/// Errors raised by the belief model, the population loop and the regression.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Breeding found no scenario with a desired result
    #[error("No viable parents in generation {generation}: no scenario reached the desired result")]
    NoViableParents { generation: usize },

    /// A configuration value is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A scenario's trial sequence has the wrong length for its population
    #[error("Sequence length mismatch: expected {expected}, found {found}")]
    SequenceLengthMismatch { expected: usize, found: usize },

    /// Least-squares fit could not be computed
    #[error("Regression failed: {0}")]
    Regression(String),
}

impl ModelError {
    /// Creates an invalid-parameter error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates a regression error.
    pub fn regression(msg: impl Into<String>) -> Self {
        Self::Regression(msg.into())
    }
}
