//! Offspring production: uniform crossover and per-gene mutation.

use crate::Genotype;
use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A per-gene mutation probability, guaranteed to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MutationRate(f64);

impl MutationRate {
    pub const NONE: MutationRate = MutationRate(0.0);
    pub const ALWAYS: MutationRate = MutationRate(1.0);

    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        if (0.0..=1.0).contains(&rate) {
            Ok(Self(rate))
        } else {
            // NaN lands here too
            Err(ConfigError::InvalidMutationRate(rate))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for MutationRate {
    fn default() -> Self {
        Self(0.2)
    }
}

impl TryFrom<f64> for MutationRate {
    type Error = ConfigError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<MutationRate> for f64 {
    fn from(rate: MutationRate) -> Self {
        rate.0
    }
}

/// Builds a child whose every gene is copied from one of the two parents.
///
/// Neither parent is modified.
pub fn crossover<G: Genotype, R: Rng>(parent_a: &G, parent_b: &G, rng: &mut R) -> G {
    parent_a.crossover(parent_b, rng)
}

/// Returns a mutated copy of `individual`; the input is left untouched.
pub fn mutate<G: Genotype, R: Rng>(individual: &G, rate: MutationRate, rng: &mut R) -> G {
    let mut child = individual.clone();
    child.mutate(rng, rate);
    child
}
