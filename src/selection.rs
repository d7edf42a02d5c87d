//! Parent selection over a scored population.
//!
//! Both strategies are stateless: they see only the population, the
//! index-aligned score slice and the caller's generator.

use crate::cmp_score_nan_last;
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;

fn default_tournament_size() -> usize {
    DEFAULT_TOURNAMENT_SIZE
}

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    /// Fitness-proportionate selection. Non-positive scores get zero weight.
    #[default]
    Roulette,
    /// Best of `size` distinct individuals drawn uniformly.
    Tournament {
        #[serde(default = "default_tournament_size")]
        size: usize,
    },
}

impl Selection {
    /// Tournament selection with the default sample size.
    pub fn tournament() -> Self {
        Selection::Tournament {
            size: DEFAULT_TOURNAMENT_SIZE,
        }
    }

    /// Picks the index of one parent.
    ///
    /// # Panics
    ///
    /// Panics if `scores` is empty.
    pub fn select_index<R: Rng>(&self, scores: &[f64], rng: &mut R) -> usize {
        assert!(!scores.is_empty(), "cannot select from an empty population");
        match *self {
            Selection::Roulette => roulette_index(scores, rng),
            Selection::Tournament { size } => tournament_index(scores, size, rng),
        }
    }

    /// Picks one parent from `population`, whose order matches `scores`.
    pub fn select<'a, G, R: Rng>(&self, population: &'a [G], scores: &[f64], rng: &mut R) -> &'a G {
        debug_assert_eq!(population.len(), scores.len());
        &population[self.select_index(scores, rng)]
    }

    /// Two independent picks, with replacement.
    pub fn select_parents<'a, G, R: Rng>(
        &self,
        population: &'a [G],
        scores: &[f64],
        rng: &mut R,
    ) -> (&'a G, &'a G) {
        let a = self.select(population, scores, rng);
        let b = self.select(population, scores, rng);
        (a, b)
    }
}

fn roulette_weight(score: f64) -> f64 {
    // NaN and negatives weigh nothing
    if score > 0.0 { score } else { 0.0 }
}

fn roulette_index<R: Rng>(scores: &[f64], rng: &mut R) -> usize {
    let total: f64 = scores.iter().map(|&s| roulette_weight(s)).sum();
    if !(total > 0.0 && total.is_finite()) {
        return rng.random_range(0..scores.len());
    }

    let r = rng.random::<f64>();
    let mut cumulative = 0.0;
    for (i, &score) in scores.iter().enumerate() {
        cumulative += roulette_weight(score) / total;
        if r <= cumulative {
            return i;
        }
    }
    // Rounding left the cumulative sum short of r
    rng.random_range(0..scores.len())
}

fn tournament_index<R: Rng>(scores: &[f64], size: usize, rng: &mut R) -> usize {
    let k = size.clamp(1, scores.len());
    let mut best: Option<usize> = None;
    for i in index::sample(rng, scores.len(), k).iter() {
        best = match best {
            Some(b) if cmp_score_nan_last(scores[i], scores[b]) != Ordering::Greater => Some(b),
            _ => Some(i),
        };
    }
    best.unwrap_or(0)
}
