//! Evolutionary refinement of scenario populations.
//!
//! A population of evidence sequences is simulated generation by generation:
//!
//! ```text
//!   ┌──────────┐   simulate   ┌───────┐  homogeneity >= 0.9  ┌───────────┐
//!   │ Running  │ ───────────► │ score │ ───────────────────► │ Converged │
//!   └──────────┘              └───┬───┘                      └───────────┘
//!        ▲                        │ otherwise
//!        └──────── breed ◄────────┘ (parents: desired_result == true)
//! ```
//!
//! Scenario simulation is data-parallel. Each scenario receives its own
//! ChaCha8 stream seeded from the population's generator in fixed order, so
//! results do not depend on the number of worker threads.

use crate::belief::BeliefAgent;
use crate::error::ModelError;
use crate::evidence::{self, EvidenceConfig, EvidenceKind};
use crate::params::{AgentPriors, BeliefBand};
use crate::scenario::{Scenario, TrialOutcome};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Population size used in the reference sweep.
pub const DEFAULT_POPULATION_SIZE: usize = 500;

/// Fraction of identical genotypes at which a population counts as converged.
pub const HOMOGENEITY_THRESHOLD: f64 = 0.9;

/// Configuration for one population run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of scenarios per generation
    pub size: usize,

    /// Length of every trial sequence
    pub trials: usize,

    /// Confidence weight applied to the prior credence (0, 1 or 2)
    pub confidence_weight: f64,

    pub priors: AgentPriors,
    pub band: BeliefBand,
    pub evidence: EvidenceConfig,

    /// Convergence threshold for the homogeneity check
    pub homogeneity_threshold: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_POPULATION_SIZE,
            trials: 5,
            confidence_weight: 1.0,
            priors: AgentPriors::default(),
            band: BeliefBand::default(),
            evidence: EvidenceConfig::default(),
            homogeneity_threshold: HOMOGENEITY_THRESHOLD,
        }
    }
}

impl PopulationConfig {
    /// Creates a config with reference defaults for the given shape.
    pub fn new(size: usize, trials: usize) -> Self {
        Self {
            size,
            trials,
            ..Default::default()
        }
    }

    pub fn with_confidence_weight(mut self, weight: f64) -> Self {
        self.confidence_weight = weight;
        self
    }

    pub fn with_priors(mut self, priors: AgentPriors) -> Self {
        self.priors = priors;
        self
    }

    pub fn with_evidence(mut self, evidence: EvidenceConfig) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.size == 0 {
            return Err(ModelError::invalid("population size must be positive"));
        }
        if self.trials == 0 {
            return Err(ModelError::invalid("trial sequences must not be empty"));
        }
        if !(self.homogeneity_threshold > 0.0 && self.homogeneity_threshold <= 1.0) {
            return Err(ModelError::invalid(format!(
                "homogeneity threshold {} outside (0, 1]",
                self.homogeneity_threshold
            )));
        }
        if !self.confidence_weight.is_finite() || self.confidence_weight < 0.0 {
            return Err(ModelError::invalid("confidence weight must be a non-negative number"));
        }
        self.priors.validate()?;
        self.band.validate()?;
        self.evidence.validate()
    }
}

/// Lifecycle of a population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationState {
    Running,
    Converged,
}

/// Result of a converged population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergedPopulation {
    /// The reference genotype the population converged onto
    pub trials: Vec<EvidenceKind>,

    /// Fraction of the whole final population with a desired result
    pub percent_correct: f64,

    /// Fraction of the final population identical to `trials`
    pub homogeneity: f64,

    /// Number of generations simulated, including the last one
    pub generations: usize,
}

/// Walks one fresh agent through `trials`.
///
/// The agent stops gathering evidence as soon as its credence leaves the
/// undecided band. When it has left the band the desired result is its
/// effective belief; an agent that never leaves the band scores false.
pub fn simulate_trials<R: Rng + ?Sized>(
    trials: &[EvidenceKind],
    config: &PopulationConfig,
    rng: &mut R,
) -> TrialOutcome {
    let priors = config.priors.sample(rng);
    let mut agent = BeliefAgent::new(
        priors.intuition_reliability(),
        priors.prior_credence(config.confidence_weight),
        rng,
    );

    let mut ending_round = 0;
    for &kind in trials {
        if !config.band.contains(agent.credence()) {
            break;
        }
        ending_round += 1;
        evidence::gather(kind, &mut agent, &priors, &config.evidence, rng);
    }

    let settled = !config.band.contains(agent.credence());
    TrialOutcome {
        ending_round,
        ending_credence: agent.credence(),
        starting_intuition: agent.starting_intuition(),
        desired_result: settled && agent.belief(),
    }
}

/// An evolving collection of scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioPopulation {
    config: PopulationConfig,
    scenarios: Vec<Scenario>,
    generation: usize,
    state: PopulationState,
}

impl ScenarioPopulation {
    /// Creates a population of fresh random scenarios.
    pub fn new<R: Rng + ?Sized>(config: PopulationConfig, rng: &mut R) -> Result<Self, ModelError> {
        config.validate()?;
        let scenarios = (0..config.size).map(|_| Scenario::fresh(config.trials, rng)).collect();
        Ok(Self {
            config,
            scenarios,
            generation: 0,
            state: PopulationState::Running,
        })
    }

    /// Creates a population from explicit scenarios.
    ///
    /// The population size becomes the number of scenarios given.
    pub fn from_scenarios(
        mut config: PopulationConfig,
        scenarios: Vec<Scenario>,
    ) -> Result<Self, ModelError> {
        config.size = scenarios.len();
        config.validate()?;
        if let Some(bad) = scenarios.iter().find(|s| s.len() != config.trials) {
            return Err(ModelError::SequenceLengthMismatch {
                expected: config.trials,
                found: bad.len(),
            });
        }
        Ok(Self {
            config,
            scenarios,
            generation: 0,
            state: PopulationState::Running,
        })
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Index of the current generation, starting at 0.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn state(&self) -> PopulationState {
        self.state
    }

    /// Simulates every scenario of the current generation.
    pub fn simulate_generation<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let seeds: Vec<u64> = (0..self.scenarios.len()).map(|_| rng.next_u64()).collect();
        let config = &self.config;

        self.scenarios
            .par_iter_mut()
            .zip(seeds.into_par_iter())
            .for_each(|(scenario, seed)| {
                let mut local = ChaCha8Rng::seed_from_u64(seed);
                let outcome = simulate_trials(scenario.trials(), config, &mut local);
                scenario.record(outcome);
            });
    }

    /// Fraction of scenarios whose trials equal the first scenario's.
    pub fn homogeneity(&self) -> f64 {
        let Some(reference) = self.scenarios.first() else {
            return 0.0;
        };
        let matching = self
            .scenarios
            .iter()
            .filter(|s| s.trials() == reference.trials())
            .count();
        matching as f64 / self.scenarios.len() as f64
    }

    /// Fraction of scenarios with a desired result.
    pub fn percent_correct(&self) -> f64 {
        if self.scenarios.is_empty() {
            return 0.0;
        }
        let correct = self.scenarios.iter().filter(|s| s.desired_result()).count();
        correct as f64 / self.scenarios.len() as f64
    }

    /// Breeds a full replacement generation from the successful scenarios.
    pub fn breed<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Scenario>, ModelError> {
        let parents: Vec<&Scenario> =
            self.scenarios.iter().filter(|s| s.desired_result()).collect();
        if parents.is_empty() {
            return Err(ModelError::NoViableParents {
                generation: self.generation,
            });
        }

        let mut children = Vec::with_capacity(self.config.size);
        while children.len() < self.config.size {
            let (Some(first), Some(second)) = (parents.choose(rng), parents.choose(rng)) else {
                return Err(ModelError::NoViableParents {
                    generation: self.generation,
                });
            };
            children.push(Scenario::bred(first, second, rng));
        }
        Ok(children)
    }

    /// Runs one generation: simulate, score, then converge or breed.
    ///
    /// Returns `Some` once the population has converged.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<ConvergedPopulation>, ModelError> {
        if self.state == PopulationState::Converged {
            return Ok(Some(self.converged()));
        }

        self.simulate_generation(rng);
        let homogeneity = self.homogeneity();

        debug!(
            generation = self.generation,
            homogeneity,
            percent_correct = self.percent_correct(),
            "Generation simulated"
        );

        if homogeneity >= self.config.homogeneity_threshold {
            self.state = PopulationState::Converged;
            return Ok(Some(self.converged()));
        }

        self.scenarios = self.breed(rng)?;
        self.generation += 1;
        Ok(None)
    }

    /// Steps until converged or a breeding failure.
    pub fn run_to_convergence<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
    ) -> Result<ConvergedPopulation, ModelError> {
        loop {
            if let Some(result) = self.step(rng)? {
                return Ok(result);
            }
        }
    }

    fn converged(&self) -> ConvergedPopulation {
        ConvergedPopulation {
            trials: self.scenarios.first().map(|s| s.trials().to_vec()).unwrap_or_default(),
            percent_correct: self.percent_correct(),
            homogeneity: self.homogeneity(),
            generations: self.generation + 1,
        }
    }
}
