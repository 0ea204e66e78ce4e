//! Intuition Pump Core - Bayesian agents under noisy social evidence
//!
//! This library models an agent that holds an intuition and a credence in it,
//! then revises that credence by polling peers, attending a conference or
//! consulting an expert:
//! 1. **Belief**: symmetric Bayesian update with an absorbing boundary
//! 2. **Evidence**: transient sub-populations that vote on a public comment
//! 3. **Population**: evolutionary search over evidence-gathering sequences
//! 4. **Regression**: least-squares fit of success rate against sequence shape

pub mod belief;
pub mod error;
pub mod evidence;
pub mod params;
pub mod population;
pub mod regression;
pub mod scenario;

// Re-export key types for convenience
pub use belief::{BeliefAgent, UpdateOutcome};
pub use error::ModelError;
pub use evidence::{EvidenceConfig, EvidenceKind, PollConfig, SpeakerSelection};
pub use params::{AgentPriors, BeliefBand, UniformRange};
pub use population::{ConvergedPopulation, PopulationConfig, PopulationState, ScenarioPopulation};
pub use regression::{LinearRegression, RegressionFit};
pub use scenario::{Scenario, TrialOutcome};
