//! JSON exporter for full experiment results.
//!
//! The CSV tables only carry the fitted coefficients. The export keeps every
//! converged sequence so the fits can be re-examined offline.

use crate::config::ExperimentConfig;
use crate::error::RunError;
use crate::experiment::{BucketSummary, ModifierTable, RepetitionResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// One converged population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepetitionExport {
    /// Trial codes (1 = peer, 2 = conference, 3 = expert)
    pub sequence: Vec<u8>,
    pub percent_correct: f64,
    pub generations: usize,
    pub homogeneity: f64,
}

impl From<&RepetitionResult> for RepetitionExport {
    fn from(r: &RepetitionResult) -> Self {
        Self {
            sequence: r.trials.iter().map(|k| k.code()).collect(),
            percent_correct: r.percent_correct,
            generations: r.generations,
            homogeneity: r.homogeneity,
        }
    }
}

/// One (modifier, length) bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketExport {
    pub number_of_trials: usize,
    pub coefficients: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intercept: Option<f64>,
    pub std_error: f64,
    pub mean_percent_correct: f64,
    pub repetitions: Vec<RepetitionExport>,
}

impl From<&BucketSummary> for BucketExport {
    fn from(b: &BucketSummary) -> Self {
        Self {
            number_of_trials: b.number_of_trials,
            coefficients: b.fit.coefficients.clone(),
            intercept: b.fit.intercept,
            std_error: b.fit.std_error,
            mean_percent_correct: b.mean_percent_correct,
            repetitions: b.repetitions.iter().map(RepetitionExport::from).collect(),
        }
    }
}

/// One modifier's buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableExport {
    pub modifier: String,
    pub buckets: Vec<BucketExport>,
}

/// Complete experiment export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentExport {
    /// Master seed (0 = unseeded)
    pub seed: u64,

    /// Configuration the grid ran with
    pub config: ExperimentConfig,

    pub tables: Vec<TableExport>,
}

impl ExperimentExport {
    /// Creates an empty export container.
    pub fn new(seed: u64, config: ExperimentConfig) -> Self {
        Self {
            seed,
            config,
            tables: Vec::new(),
        }
    }

    /// Adds a finished modifier table.
    pub fn add_table(&mut self, table: &ModifierTable) {
        self.tables.push(TableExport {
            modifier: table.modifier.name().to_string(),
            buckets: table.rows.iter().map(BucketExport::from).collect(),
        });
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), RunError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
