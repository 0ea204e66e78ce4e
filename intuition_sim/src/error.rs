//! Error types for experiment runs.

use crate::config::ConfidenceModifier;
use intuition_core::ModelError;
use intuition_env::EnvError;
use thiserror::Error;

/// Errors that can abort an experiment or one of its outputs.
#[derive(Debug, Error)]
pub enum RunError {
    /// A single population run failed
    #[error("{modifier} / {trials} trials / repetition {repetition}: {source}")]
    Repetition {
        modifier: ConfidenceModifier,
        trials: usize,
        repetition: usize,
        #[source]
        source: ModelError,
    },

    /// Model-level failure outside a repetition (validation, regression)
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Output sink failure
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Config file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// CSV rendering failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON export failed
    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
