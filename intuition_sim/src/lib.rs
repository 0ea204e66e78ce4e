//! Intuition Pump Experiment Harness
//!
//! Drives the evolutionary scenario search over the full experiment grid:
//!
//! ```text
//! for modifier in {under-confident, control, over-confident}
//!   for trials in 5..=15
//!     for repetition in 0..50
//!       ScenarioPopulation::run_to_convergence()      -> RepetitionResult
//!     SequenceFeatures + LinearRegression             -> BucketSummary
//!   report::render_table()                            -> <modifier>.csv
//! ```
//!
//! Every repetition draws from its own random stream, derived from one
//! `EntropySource`, so a seeded run reproduces the whole grid.
//!
//! # Usage
//!
//! ```ignore
//! use intuition_sim::{ExperimentConfig, ExperimentDriver, ConfidenceModifier};
//! use intuition_env::SeededEntropy;
//!
//! let driver = ExperimentDriver::new(ExperimentConfig::default(), SeededEntropy::shared(42));
//! let table = driver.run_modifier(ConfidenceModifier::Control)?;
//! ```

mod config;
mod error;
mod experiment;
pub mod export;
pub mod report;

pub use config::{ConfidenceModifier, ExperimentConfig};
pub use error::RunError;
pub use experiment::{
    BucketSummary, ExperimentDriver, ModifierTable, RepetitionResult, SequenceFeatures,
};
pub use export::ExperimentExport;
