//! Core entropy trait for simulation components.

use rand_chacha::ChaCha8Rng;

/// Identifier of an independent random stream.
///
/// Callers pack whatever coordinates identify a unit of work (grid cell,
/// repetition index) into one value; two different ids must never be reused
/// for two different units within the same experiment.
pub type StreamId = u64;

/// The central interface for randomness.
///
/// # Implementations
///
/// - **Production**: `OsEntropy` - every stream is seeded from `OsRng`
/// - **Reproducible**: `SeededEntropy` - every stream is derived from a master seed
///
/// Components never reach for `thread_rng()`; they receive an `Rng` derived
/// from this trait and thread it through explicitly.
pub trait EntropySource: Send + Sync + 'static {
    /// Returns a random generator for the given stream.
    ///
    /// For seeded sources the same `(seed, stream)` pair always yields the
    /// same sequence. For unseeded sources each call yields a fresh sequence.
    fn derive_rng(&self, stream: StreamId) -> ChaCha8Rng;

    /// Returns the master seed (for logging/export).
    ///
    /// Unseeded sources return 0.
    fn seed(&self) -> u64;

    /// Returns true if streams are reproducible.
    fn is_deterministic(&self) -> bool {
        self.seed() != 0
    }
}
