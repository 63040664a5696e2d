//! File-backed move advisor for the minehint puzzle.
//!
//! The pure analysis lives in `minehint-core`; this crate adds the persisted
//! experience store and the [`MoveAdvisor`] that ties the tiers together.

pub use advisor::*;
pub use config::*;
pub use error::*;
pub use storage::*;
pub use store::*;

mod advisor;
mod config;
mod error;
mod storage;
mod store;

use rand::rngs::SmallRng;

/// Advisor wired to the configured experience file and RNG.
pub fn open(config: &AdvisorConfig) -> MoveAdvisor<FileStorage, SmallRng> {
    MoveAdvisor::new(config.open_store(), config.rng()).with_persistence(config.persist)
}
