//! Scenario records: one candidate evidence-gathering sequence.

use crate::evidence::EvidenceKind;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What happened when one agent walked a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Number of trials actually consumed before the agent made up its mind
    pub ending_round: usize,

    /// Credence after the last consumed trial
    pub ending_credence: f64,

    /// The walking agent's starting intuition
    pub starting_intuition: bool,

    /// Whether the agent settled on the correct resolution
    pub desired_result: bool,
}

/// A candidate sequence of evidence-gathering actions.
///
/// The trial sequence is fixed at construction; new sequences only come
/// from [`Scenario::bred`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    trials: Vec<EvidenceKind>,
    outcome: Option<TrialOutcome>,
}

impl Scenario {
    /// A scenario with `length` uniformly random trials.
    pub fn fresh<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Self {
        let trials = (0..length).map(|_| EvidenceKind::random(rng)).collect();
        Self::from_trials(trials)
    }

    pub fn from_trials(trials: Vec<EvidenceKind>) -> Self {
        Self { trials, outcome: None }
    }

    /// Uniform crossover: each position is copied from either parent with
    /// equal probability.
    ///
    /// Both parents must have the same length; extra positions in the longer
    /// parent are ignored.
    pub fn bred<R: Rng + ?Sized>(first: &Scenario, second: &Scenario, rng: &mut R) -> Self {
        let trials = first
            .trials
            .iter()
            .zip(second.trials.iter())
            .map(|(a, b)| if rng.gen_bool(0.5) { *a } else { *b })
            .collect();
        Self::from_trials(trials)
    }

    pub fn trials(&self) -> &[EvidenceKind] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Outcome of the latest simulation pass, if any.
    pub fn outcome(&self) -> Option<&TrialOutcome> {
        self.outcome.as_ref()
    }

    /// False until a pass has recorded a desired result.
    pub fn desired_result(&self) -> bool {
        self.outcome.map_or(false, |o| o.desired_result)
    }

    pub(crate) fn record(&mut self, outcome: TrialOutcome) {
        self.outcome = Some(outcome);
    }
}
