//! Production entropy source backed by the operating system.

use crate::entropy::{EntropySource, StreamId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Unseeded entropy source.
///
/// This is the default for experiment runs: each stream is seeded from
/// `OsRng`, so two runs never share random draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl OsEntropy {
    /// Creates a new OsEntropy.
    pub fn new() -> Self {
        Self
    }

    /// Creates an Arc-wrapped source for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl EntropySource for OsEntropy {
    fn derive_rng(&self, _stream: StreamId) -> ChaCha8Rng {
        ChaCha8Rng::from_entropy()
    }

    fn seed(&self) -> u64 {
        // Not seeded
        0
    }
}
