//! Experiment driver - runs the modifier × length × repetition grid.

use crate::config::{ConfidenceModifier, ExperimentConfig};
use crate::error::RunError;

use intuition_core::{EvidenceKind, LinearRegression, RegressionFit, ScenarioPopulation};
use intuition_env::{EntropySource, StreamId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one converged population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepetitionResult {
    /// Representative sequence the population converged onto
    pub trials: Vec<EvidenceKind>,

    /// Fraction of the final population with a desired result
    pub percent_correct: f64,

    /// Sequence length of the bucket
    pub number_of_trials: usize,

    /// Generations until convergence
    pub generations: usize,

    /// Final homogeneity
    pub homogeneity: f64,
}

/// Six shape features of a trial sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequenceFeatures {
    pub peer_first: u8,
    pub conference_first: u8,
    pub expert_first: u8,
    pub peer_count: usize,
    pub conference_count: usize,
    pub expert_count: usize,
}

impl SequenceFeatures {
    pub fn from_trials(trials: &[EvidenceKind]) -> Self {
        let mut features = Self::default();
        match trials.first() {
            Some(EvidenceKind::Peer) => features.peer_first = 1,
            Some(EvidenceKind::Conference) => features.conference_first = 1,
            Some(EvidenceKind::Expert) => features.expert_first = 1,
            None => {}
        }
        for kind in trials {
            match kind {
                EvidenceKind::Peer => features.peer_count += 1,
                EvidenceKind::Conference => features.conference_count += 1,
                EvidenceKind::Expert => features.expert_count += 1,
            }
        }
        features
    }

    /// Design-matrix row, in the column order of the result table.
    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.peer_first as f64,
            self.conference_first as f64,
            self.expert_first as f64,
            self.peer_count as f64,
            self.conference_count as f64,
            self.expert_count as f64,
        ]
    }
}

/// Regression result for one (modifier, length) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub number_of_trials: usize,
    pub fit: RegressionFit,
    pub mean_percent_correct: f64,
    pub repetitions: Vec<RepetitionResult>,
}

/// All buckets of one confidence modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierTable {
    pub modifier: ConfidenceModifier,
    pub rows: Vec<BucketSummary>,
}

/// Packs grid coordinates into a stream id.
fn stream_id(modifier: ConfidenceModifier, trials: usize, repetition: usize) -> StreamId {
    (modifier.index() << 48) | ((trials as u64 & 0xFF_FFFF) << 24) | (repetition as u64 & 0xFF_FFFF)
}

/// Runs experiment cells.
pub struct ExperimentDriver {
    config: ExperimentConfig,
    entropy: Arc<dyn EntropySource>,
    regression: LinearRegression,
}

impl ExperimentDriver {
    /// Creates a new driver.
    pub fn new(config: ExperimentConfig, entropy: Arc<dyn EntropySource>) -> Self {
        let regression = LinearRegression::new(config.fit_intercept);
        Self {
            config,
            entropy,
            regression,
        }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Runs one population to convergence on its own random stream.
    pub fn run_repetition(
        &self,
        modifier: ConfidenceModifier,
        trials: usize,
        repetition: usize,
    ) -> Result<RepetitionResult, RunError> {
        let mut rng = self.entropy.derive_rng(stream_id(modifier, trials, repetition));
        let wrap = |source| RunError::Repetition {
            modifier,
            trials,
            repetition,
            source,
        };

        let config = self.config.population_for(modifier, trials);
        let population = ScenarioPopulation::new(config, &mut rng).map_err(wrap)?;
        let converged = population.run_to_convergence(&mut rng).map_err(wrap)?;

        debug!(
            %modifier,
            trials,
            repetition,
            generations = converged.generations,
            percent_correct = converged.percent_correct,
            "Repetition converged"
        );

        Ok(RepetitionResult {
            trials: converged.trials,
            percent_correct: converged.percent_correct,
            number_of_trials: trials,
            generations: converged.generations,
            homogeneity: converged.homogeneity,
        })
    }

    /// Runs every repetition of one bucket and fits the shape model.
    pub fn run_bucket(
        &self,
        modifier: ConfidenceModifier,
        trials: usize,
    ) -> Result<BucketSummary, RunError> {
        let repetitions = (0..self.config.repetitions)
            .map(|repetition| self.run_repetition(modifier, trials, repetition))
            .collect::<Result<Vec<_>, _>>()?;

        let summary = summarize(trials, repetitions, &self.regression)?;

        info!(
            "{} | {:>2} trials | {:.3} correct | std error {:.4}",
            modifier, trials, summary.mean_percent_correct, summary.fit.std_error
        );
        if let Some(intercept) = summary.fit.intercept {
            debug!(%modifier, trials, intercept, "Fitted intercept");
        }

        Ok(summary)
    }

    /// Runs every bucket of one modifier.
    pub fn run_modifier(&self, modifier: ConfidenceModifier) -> Result<ModifierTable, RunError> {
        info!("Starting modifier: {} (weight={})", modifier, modifier.weight());

        let rows = self
            .config
            .trial_lengths()
            .map(|trials| self.run_bucket(modifier, trials))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModifierTable { modifier, rows })
    }

    /// Runs the whole grid.
    pub fn run_all(&self) -> Result<Vec<ModifierTable>, RunError> {
        self.config
            .modifiers
            .iter()
            .map(|modifier| self.run_modifier(*modifier))
            .collect()
    }
}

/// Builds the design matrix and fits one bucket.
pub(crate) fn summarize(
    trials: usize,
    repetitions: Vec<RepetitionResult>,
    regression: &LinearRegression,
) -> Result<BucketSummary, RunError> {
    let rows: Vec<Vec<f64>> = repetitions
        .iter()
        .map(|r| SequenceFeatures::from_trials(&r.trials).to_row())
        .collect();
    let response: Vec<f64> = repetitions.iter().map(|r| r.percent_correct).collect();

    let fit = regression.fit_rows(&rows, &response)?;
    let mean_percent_correct = if response.is_empty() {
        0.0
    } else {
        response.iter().sum::<f64>() / response.len() as f64
    };

    Ok(BucketSummary {
        number_of_trials: trials,
        fit,
        mean_percent_correct,
        repetitions,
    })
}
