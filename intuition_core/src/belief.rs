//! Bayesian belief agent.
//!
//! An agent holds a starting intuition (a boolean proposition it leans
//! toward) and a credence that the intuition is true. Every piece of binary
//! evidence is folded in with Bayes' rule, using the source's reliability as
//! the likelihood:
//!
//! ```text
//! P(H|D) = P(D|H) * P(H) / (P(D|H) * P(H) + P(D|H') * (1 - P(H)))
//! ```
//!
//! A credence of exactly 0 or 1 is absorbing: no later evidence can move it.

use rand::Rng;

/// Result of a single update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Credence was recomputed
    Applied,
    /// Credence was already at a boundary, or the posterior was 0/0
    Absorbed,
}

/// A single agent in the thought experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeliefAgent {
    /// Probability that the starting intuition is true
    credence: f64,

    /// The proposition the agent initially leans toward
    starting_intuition: bool,
}

impl BeliefAgent {
    /// Creates an agent whose intuition is true with probability `reliability`.
    pub fn new<R: Rng + ?Sized>(reliability: f64, credence: f64, rng: &mut R) -> Self {
        let starting_intuition = rng.gen::<f64>() < reliability;
        Self::with_intuition(credence, starting_intuition)
    }

    /// Creates an agent with a fixed intuition.
    pub fn with_intuition(credence: f64, starting_intuition: bool) -> Self {
        Self {
            credence: credence.clamp(0.0, 1.0),
            starting_intuition,
        }
    }

    pub fn credence(&self) -> f64 {
        self.credence
    }

    pub fn starting_intuition(&self) -> bool {
        self.starting_intuition
    }

    /// True once the credence has hit 0 or 1.
    pub fn is_absorbed(&self) -> bool {
        self.credence <= 0.0 || self.credence >= 1.0
    }

    /// Folds one observation into the credence.
    ///
    /// `probability` is P(evidence | the starting intuition is right) and is
    /// clamped to [0, 1]. Evidence agreeing with the intuition raises the
    /// credence whenever `probability > 0.5`.
    pub fn update(&mut self, evidence: bool, probability: f64) -> UpdateOutcome {
        if self.is_absorbed() {
            return UpdateOutcome::Absorbed;
        }

        let p = probability.clamp(0.0, 1.0);
        let q = 1.0 - p;
        let c = self.credence;

        let (supporting, opposing) = if evidence == self.starting_intuition {
            (p * c, q * (1.0 - c))
        } else {
            (q * c, p * (1.0 - c))
        };

        let denominator = supporting + opposing;
        if denominator <= 0.0 || !denominator.is_finite() {
            return UpdateOutcome::Absorbed;
        }

        self.credence = (supporting / denominator).clamp(0.0, 1.0);
        UpdateOutcome::Applied
    }

    /// The agent's current effective belief.
    ///
    /// This is the starting intuition while the credence is at least 0.5 and
    /// its negation otherwise.
    pub fn belief(&self) -> bool {
        if self.credence >= 0.5 {
            self.starting_intuition
        } else {
            !self.starting_intuition
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_update_matches_bayes() {
        let mut agent = BeliefAgent::with_intuition(0.6, true);
        assert_eq!(agent.update(true, 0.7), UpdateOutcome::Applied);

        // 0.7 * 0.6 / (0.7 * 0.6 + 0.3 * 0.4)
        assert_relative_eq!(agent.credence(), 0.42 / 0.54, epsilon = 1e-12);

        agent.update(true, 0.7);
        assert!(agent.credence() > 0.42 / 0.54);
    }

    #[test]
    fn test_contrary_evidence_lowers_credence() {
        let mut agent = BeliefAgent::with_intuition(0.6, true);
        agent.update(false, 0.7);

        // 0.3 * 0.6 / (0.3 * 0.6 + 0.7 * 0.4)
        assert_relative_eq!(agent.credence(), 0.18 / 0.46, epsilon = 1e-12);
        assert!(!agent.belief());
    }

    #[test]
    fn test_uninformative_evidence_is_neutral() {
        let mut agent = BeliefAgent::with_intuition(0.73, false);
        agent.update(true, 0.5);
        assert_relative_eq!(agent.credence(), 0.73, epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_credence_is_absorbing() {
        let mut certain = BeliefAgent::with_intuition(1.0, true);
        assert_eq!(certain.update(false, 0.9), UpdateOutcome::Absorbed);
        assert_eq!(certain.credence(), 1.0);

        let mut doubting = BeliefAgent::with_intuition(0.0, true);
        assert_eq!(doubting.update(true, 0.9), UpdateOutcome::Absorbed);
        assert_eq!(doubting.credence(), 0.0);
    }

    #[test]
    fn test_certain_source_saturates_then_absorbs() {
        let mut agent = BeliefAgent::with_intuition(0.7, true);

        assert_eq!(agent.update(true, 1.0), UpdateOutcome::Applied);
        assert_eq!(agent.credence(), 1.0);

        assert_eq!(agent.update(false, 1.0), UpdateOutcome::Absorbed);
        assert_eq!(agent.credence(), 1.0);
        assert!(!agent.credence().is_nan());
    }

    #[test]
    fn test_intuition_follows_reliability() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        assert!((0..100).all(|_| BeliefAgent::new(1.0, 0.5, &mut rng).starting_intuition()));
        assert!((0..100).all(|_| !BeliefAgent::new(0.0, 0.5, &mut rng).starting_intuition()));

        let trues = (0..10_000)
            .filter(|_| BeliefAgent::new(0.65, 0.5, &mut rng).starting_intuition())
            .count();
        assert!((6_200..6_800).contains(&trues), "got {}", trues);
    }

    proptest! {
        #[test]
        fn prop_update_stays_in_open_interval(
            credence in 0.01f64..0.99,
            probability in 0.01f64..0.99,
            evidence in any::<bool>(),
            intuition in any::<bool>(),
        ) {
            let mut agent = BeliefAgent::with_intuition(credence, intuition);
            prop_assert_eq!(agent.update(evidence, probability), UpdateOutcome::Applied);
            prop_assert!(agent.credence() > 0.0 && agent.credence() < 1.0);
        }

        #[test]
        fn prop_belief_consistent_with_credence(
            credence in 0.0f64..=1.0,
            intuition in any::<bool>(),
        ) {
            let agent = BeliefAgent::with_intuition(credence, intuition);
            prop_assert_eq!(agent.belief() == intuition, credence >= 0.5);
        }

        #[test]
        fn prop_update_symmetry(
            credence in 0.01f64..0.99,
            probability in 0.01f64..0.99,
            intuition in any::<bool>(),
        ) {
            let mut agreeing = BeliefAgent::with_intuition(credence, intuition);
            let mut disagreeing = BeliefAgent::with_intuition(credence, intuition);

            agreeing.update(intuition, probability);
            disagreeing.update(!intuition, 1.0 - probability);

            prop_assert!((agreeing.credence() - disagreeing.credence()).abs() < 1e-12);
        }
    }
}
