//! Random source standing in for the step sensor and typing jitter

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of the simulated randomness. Injected so tests can pin outcomes.
pub trait RandomSource: Send {
    /// Returns true with the given probability (clamped to `[0, 1]`)
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform duration in `[low, high)`; `low` when the range is empty
    fn between(&mut self, low: Duration, high: Duration) -> Duration;
}

/// `StdRng`-backed source, seeded from the OS or from a fixed seed
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Seeded when a seed is given, otherwise from OS entropy
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for StdRandom {
    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn between(&mut self, low: Duration, high: Duration) -> Duration {
        let span = high.saturating_sub(low).as_micros() as u64;
        if span == 0 {
            return low;
        }
        low + Duration::from_micros(self.rng.gen_range(0..span))
    }
}

/// Deterministic source: every chance resolves to `hit`, every range to its
/// lower bound
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub hit: bool,
}

impl FixedRandom {
    pub fn always() -> Self {
        Self { hit: true }
    }

    pub fn never() -> Self {
        Self { hit: false }
    }
}

impl RandomSource for FixedRandom {
    fn chance(&mut self, _probability: f64) -> bool {
        self.hit
    }

    fn between(&mut self, low: Duration, _high: Duration) -> Duration {
        low
    }
}
