//! Model parameters shared by agents and populations.
//!
//! The numeric defaults are the constants of the reference thought
//! experiment. They are exposed as named fields so experiments can vary them,
//! but the defaults must stay as they are to reproduce the reference sweep.

use crate::error::ModelError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lower edge of the undecided band. Credence at or below it means the agent
/// has turned against its starting intuition.
pub const UNDECIDED_LOWER: f64 = 0.5;

/// Upper edge of the undecided band. Credence at or above it means the agent
/// has settled on its starting intuition.
pub const UNDECIDED_UPPER: f64 = 0.95;

/// Base reliability of intuitions, sampled per simulated agent.
pub const BASE_RELIABILITY_LOW: f64 = 0.6;
pub const BASE_RELIABILITY_HIGH: f64 = 0.7;

/// Reliability bonus for better-informed sources, sampled per simulated agent.
pub const RELIABILITY_BONUS_LOW: f64 = 0.025;
pub const RELIABILITY_BONUS_HIGH: f64 = 0.075;

/// Half-open uniform range `[low, high)`.
///
/// A degenerate range (`low == high`) always samples `low`, which lets tests
/// pin a parameter to one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    /// Creates a range.
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// A range that always samples `value`.
    pub fn fixed(value: f64) -> Self {
        Self { low: value, high: value }
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.high <= self.low {
            self.low
        } else {
            rng.gen_range(self.low..self.high)
        }
    }

    fn validate(&self, name: &str) -> Result<(), ModelError> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(ModelError::invalid(format!("{} range must be finite", name)));
        }
        if self.low > self.high {
            return Err(ModelError::invalid(format!(
                "{} range is inverted: [{}, {})",
                name, self.low, self.high
            )));
        }
        Ok(())
    }
}

/// The open interval in which an agent is still undecided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefBand {
    pub lower: f64,
    pub upper: f64,
}

impl Default for BeliefBand {
    fn default() -> Self {
        Self {
            lower: UNDECIDED_LOWER,
            upper: UNDECIDED_UPPER,
        }
    }
}

impl BeliefBand {
    /// True while the credence is strictly inside the band.
    pub fn contains(&self, credence: f64) -> bool {
        credence > self.lower && credence < self.upper
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(0.0..=1.0).contains(&self.lower) || !(0.0..=1.0).contains(&self.upper) {
            return Err(ModelError::invalid("belief band must lie within [0, 1]"));
        }
        if self.lower >= self.upper {
            return Err(ModelError::invalid(format!(
                "belief band is empty: ({}, {})",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

/// Per-agent priors for the agent that walks a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPriors {
    /// Base reliability of intuitions
    pub reliability: UniformRange,

    /// Bonus added for conference members (once) and the expert (twice)
    pub bonus: UniformRange,
}

impl Default for AgentPriors {
    fn default() -> Self {
        Self {
            reliability: UniformRange::new(BASE_RELIABILITY_LOW, BASE_RELIABILITY_HIGH),
            bonus: UniformRange::new(RELIABILITY_BONUS_LOW, RELIABILITY_BONUS_HIGH),
        }
    }
}

/// One agent's sampled priors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledPriors {
    /// Base reliability handed to the evidence sources
    pub base: f64,
    /// Sampled bonus
    pub bonus: f64,
}

impl SampledPriors {
    /// Reliability of the acting agent's own intuition.
    pub fn intuition_reliability(&self) -> f64 {
        self.base + self.bonus * 2.0
    }

    /// Starting credence, shifted upward by the confidence weight.
    ///
    /// Weight 0 is under-confident, 1 is the control, 2 is over-confident.
    pub fn prior_credence(&self, confidence_weight: f64) -> f64 {
        (self.base + self.bonus * 2.0 * confidence_weight).clamp(0.0, 1.0)
    }
}

impl AgentPriors {
    /// Draws reliability first, then bonus.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SampledPriors {
        let base = self.reliability.sample(rng);
        let bonus = self.bonus.sample(rng);
        SampledPriors { base, bonus }
    }

    /// Priors pinned to exact values.
    pub fn fixed(reliability: f64, bonus: f64) -> Self {
        Self {
            reliability: UniformRange::fixed(reliability),
            bonus: UniformRange::fixed(bonus),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.reliability.validate("reliability")?;
        self.bonus.validate("bonus")?;
        if self.reliability.low < 0.0 || self.bonus.low < 0.0 {
            return Err(ModelError::invalid("reliability and bonus must be non-negative"));
        }
        // The expert's likelihood is the largest one handed to an update
        let max_likelihood = self.reliability.high + self.bonus.high * 2.0;
        if max_likelihood > 1.0 {
            return Err(ModelError::invalid(format!(
                "reliability + 2 * bonus may reach {}, above 1",
                max_likelihood
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_band_is_open() {
        let band = BeliefBand::default();
        assert!(!band.contains(0.5));
        assert!(band.contains(0.5000001));
        assert!(band.contains(0.9));
        assert!(!band.contains(0.95));
    }

    #[test]
    fn test_fixed_range_samples_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let range = UniformRange::fixed(1.0);
        for _ in 0..10 {
            assert_eq!(range.sample(&mut rng), 1.0);
        }
    }

    #[test]
    fn test_priors_stay_in_default_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let priors = AgentPriors::default();
        for _ in 0..1000 {
            let s = priors.sample(&mut rng);
            assert!((0.6..0.7).contains(&s.base));
            assert!((0.025..0.075).contains(&s.bonus));
        }
    }

    #[test]
    fn test_prior_credence_by_confidence() {
        let s = SampledPriors { base: 0.65, bonus: 0.05 };
        assert_relative_eq!(s.prior_credence(0.0), 0.65, epsilon = 1e-12);
        assert_relative_eq!(s.prior_credence(1.0), 0.75, epsilon = 1e-12);
        assert_relative_eq!(s.prior_credence(2.0), 0.85, epsilon = 1e-12);
        assert_relative_eq!(s.intuition_reliability(), 0.75, epsilon = 1e-12);

        let high = SampledPriors { base: 0.9, bonus: 0.1 };
        assert_eq!(high.prior_credence(2.0), 1.0);
    }

    #[test]
    fn test_priors_validation() {
        assert!(AgentPriors::default().validate().is_ok());
        assert!(AgentPriors::fixed(1.0, 0.0).validate().is_ok());
        assert!(AgentPriors::fixed(0.9, 0.1).validate().is_err());

        let inverted = AgentPriors {
            reliability: UniformRange::new(0.7, 0.6),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_band_validation() {
        assert!(BeliefBand::default().validate().is_ok());
        assert!(BeliefBand { lower: 0.9, upper: 0.5 }.validate().is_err());
        assert!(BeliefBand { lower: 0.5, upper: 1.5 }.validate().is_err());
    }
}
