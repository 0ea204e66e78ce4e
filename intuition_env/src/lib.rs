//! Intuition Pump Environment Abstraction Layer
//!
//! This crate isolates everything the simulation core must not own:
//! - Randomness (`derive_rng()`), seeded or drawn from OS entropy
//! - Output (`write_table()`), to disk or to memory
//!
//! Every random stream used by an experiment is derived from one
//! `EntropySource`. With a seeded source the whole experiment grid is
//! reproducible from a single 64-bit number; with the OS source it is not.
//!
//! # Example
//!
//! ```ignore
//! use intuition_env::{EntropySource, SeededEntropy};
//!
//! let entropy = SeededEntropy::new(42);
//! let mut rng = entropy.derive_rng(7);
//! ```

mod entropy;
mod error;
mod os_impl;
mod seeded;
mod sink;

pub use entropy::{EntropySource, StreamId};
pub use error::EnvError;
pub use os_impl::OsEntropy;
pub use seeded::SeededEntropy;
pub use sink::{FsSink, MemorySink, TableSink};
