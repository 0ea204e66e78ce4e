//! Experiment configuration.

use crate::error::RunError;
use intuition_core::{ModelError, PopulationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape features per sequence (three first-trial indicators, three counts).
const SEQUENCE_FEATURES: usize = 6;

/// Confidence treatment applied to the walking agent's prior credence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceModifier {
    /// Prior credence equals the base reliability
    UnderConfident,

    /// Prior credence is raised by two bonuses
    Control,

    /// Prior credence is raised by four bonuses
    OverConfident,
}

impl ConfidenceModifier {
    /// Returns all modifiers in sweep order.
    pub fn all() -> Vec<ConfidenceModifier> {
        vec![
            ConfidenceModifier::UnderConfident,
            ConfidenceModifier::Control,
            ConfidenceModifier::OverConfident,
        ]
    }

    /// Index in the sweep (0, 1, 2).
    pub fn index(&self) -> u64 {
        match self {
            ConfidenceModifier::UnderConfident => 0,
            ConfidenceModifier::Control => 1,
            ConfidenceModifier::OverConfident => 2,
        }
    }

    /// Multiplier on the doubled bonus added to the prior credence.
    pub fn weight(&self) -> f64 {
        self.index() as f64
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfidenceModifier::UnderConfident => "underconfident",
            ConfidenceModifier::Control => "control",
            ConfidenceModifier::OverConfident => "overconfident",
        }
    }

    /// Parses a CLI selection: `all` selects every modifier.
    pub fn parse_selection(s: &str) -> Result<Vec<ConfidenceModifier>, String> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::all())
        } else {
            s.parse().map(|modifier| vec![modifier])
        }
    }

    /// Name of the result table written for this modifier.
    pub fn file_name(&self) -> &'static str {
        match self {
            ConfidenceModifier::UnderConfident => "underconfident.csv",
            ConfidenceModifier::Control => "control.csv",
            ConfidenceModifier::OverConfident => "overconfident.csv",
        }
    }
}

impl std::fmt::Display for ConfidenceModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ConfidenceModifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "under" | "underconfident" | "under_confident" | "0" => {
                Ok(ConfidenceModifier::UnderConfident)
            }
            "control" | "1" => Ok(ConfidenceModifier::Control),
            "over" | "overconfident" | "over_confident" | "2" => {
                Ok(ConfidenceModifier::OverConfident)
            }
            _ => Err(format!("Unknown modifier: {}", s)),
        }
    }
}

/// The experiment grid and the model parameters shared by every cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Confidence treatments to sweep
    pub modifiers: Vec<ConfidenceModifier>,

    /// Shortest sequence length (inclusive)
    pub min_trials: usize,

    /// Longest sequence length (inclusive)
    pub max_trials: usize,

    /// Independent population runs per (modifier, length) bucket
    pub repetitions: usize,

    /// Population template; `trials` and `confidence_weight` are set per cell
    pub population: PopulationConfig,

    /// Fit a constant term alongside the six shape features
    pub fit_intercept: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            modifiers: ConfidenceModifier::all(),
            min_trials: 5,
            max_trials: 15,
            repetitions: 50,
            population: PopulationConfig::default(),
            fit_intercept: true,
        }
    }
}

impl ExperimentConfig {
    /// Loads a (possibly partial) config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RunError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RunError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| RunError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Sequence lengths in sweep order.
    pub fn trial_lengths(&self) -> std::ops::RangeInclusive<usize> {
        self.min_trials..=self.max_trials
    }

    /// Population config for one grid cell.
    pub fn population_for(&self, modifier: ConfidenceModifier, trials: usize) -> PopulationConfig {
        let mut config = self.population.clone();
        config.trials = trials;
        config.confidence_weight = modifier.weight();
        config
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_trial_range(mut self, min_trials: usize, max_trials: usize) -> Self {
        self.min_trials = min_trials;
        self.max_trials = max_trials;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<ConfidenceModifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population.size = size;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.modifiers.is_empty() {
            return Err(ModelError::invalid("no confidence modifiers selected"));
        }
        if self.min_trials == 0 || self.min_trials > self.max_trials {
            return Err(ModelError::invalid(format!(
                "invalid trial range {}..={}",
                self.min_trials, self.max_trials
            )));
        }
        if self.repetitions == 0 {
            return Err(ModelError::invalid("repetitions must be positive"));
        }
        let fitted_columns = SEQUENCE_FEATURES + usize::from(self.fit_intercept);
        if self.repetitions <= fitted_columns {
            return Err(ModelError::invalid(format!(
                "{} repetitions cannot fit {} regression columns",
                self.repetitions, fitted_columns
            )));
        }
        self.population_for(ConfidenceModifier::OverConfident, self.min_trials)
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_parsing() {
        assert_eq!(
            "under".parse::<ConfidenceModifier>().unwrap(),
            ConfidenceModifier::UnderConfident
        );
        assert_eq!("Control".parse::<ConfidenceModifier>().unwrap(), ConfidenceModifier::Control);
        assert_eq!("2".parse::<ConfidenceModifier>().unwrap(), ConfidenceModifier::OverConfident);
        assert!("sideways".parse::<ConfidenceModifier>().is_err());
    }

    #[test]
    fn test_modifier_selection() {
        assert_eq!(ConfidenceModifier::parse_selection("all").unwrap(), ConfidenceModifier::all());
        assert_eq!(
            ConfidenceModifier::parse_selection("over").unwrap(),
            vec![ConfidenceModifier::OverConfident]
        );
        assert!(ConfidenceModifier::parse_selection("sideways").is_err());
    }

    #[test]
    fn test_modifier_weights_and_files() {
        let weights: Vec<f64> = ConfidenceModifier::all().iter().map(|m| m.weight()).collect();
        assert_eq!(weights, vec![0.0, 1.0, 2.0]);
        assert_eq!(ConfidenceModifier::OverConfident.file_name(), "overconfident.csv");
    }

    #[test]
    fn test_default_grid_matches_reference_sweep() {
        let config = ExperimentConfig::default();
        assert_eq!(config.trial_lengths().count(), 11);
        assert_eq!(config.repetitions, 50);
        assert_eq!(config.population.size, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_population_for_cell() {
        let config = ExperimentConfig::default();
        let cell = config.population_for(ConfidenceModifier::OverConfident, 9);
        assert_eq!(cell.trials, 9);
        assert_eq!(cell.confidence_weight, 2.0);
        assert_eq!(cell.size, config.population.size);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let text = r#"{"repetitions": 8, "modifiers": ["control"], "population": {"size": 40}}"#;
        let config: ExperimentConfig = serde_json::from_str(text).unwrap();
        assert_eq!(config.repetitions, 8);
        assert_eq!(config.modifiers, vec![ConfidenceModifier::Control]);
        assert_eq!(config.population.size, 40);
        assert_eq!(config.population.homogeneity_threshold, 0.9);
        assert_eq!(config.max_trials, 15);
    }

    #[test]
    fn test_partial_poll_block() {
        let text = r#"{ "population": { "evidence": { "peer": { "members": 5 } } } }"#;
        let config: ExperimentConfig = serde_json::from_str(text).unwrap();
        assert_eq!(config.population.evidence.peer.members, 5);
        assert_eq!(config.population.evidence.peer.rounds, 10);
        assert_eq!(config.population.evidence.conference.members, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(ExperimentConfig::default().with_trial_range(6, 5).validate().is_err());
        assert!(ExperimentConfig::default().with_repetitions(0).validate().is_err());
        assert!(ExperimentConfig::default().with_repetitions(7).validate().is_err());
        assert!(ExperimentConfig::default().with_repetitions(8).validate().is_ok());
        assert!(ExperimentConfig::default().with_modifiers(vec![]).validate().is_err());
        assert!(ExperimentConfig::default().with_population_size(0).validate().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let err = ExperimentConfig::from_json_file("/nonexistent/intuition.json").unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }
}
