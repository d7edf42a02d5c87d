//! Per-generation bookkeeping and the observer contract.

use crate::individual::{Gene, Individual};
use serde::{Deserialize, Serialize};

/// Summary of one completed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Zero-based generation index.
    pub generation: usize,
    /// Best individual of this generation.
    pub best: Individual,
    pub best_score: f64,
    /// Best individual across all generations so far, if any was ever scored.
    pub running_best: Option<Individual>,
    pub running_best_score: f64,
    /// Individuals whose evaluation failed in this generation.
    pub failures: usize,
}

/// Time series of each gene of the per-generation best individual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneHistory {
    series: [Vec<u8>; 6],
}

impl GeneHistory {
    pub fn push(&mut self, individual: &Individual) {
        for (gene, value) in individual.genes() {
            self.series[gene.index()].push(value);
        }
    }

    pub fn series(&self, gene: Gene) -> &[u8] {
        &self.series[gene.index()]
    }

    /// Number of generations recorded.
    pub fn len(&self) -> usize {
        self.series[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Gene, &[u8])> {
        Gene::ALL.into_iter().map(move |g| (g, self.series(g)))
    }
}

/// Outcome of a finished (or stopped) search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// `None` when no individual was ever successfully scored above the sentinel.
    pub best: Option<Individual>,
    pub best_score: f64,
    /// Best score of each generation, in order.
    pub score_history: Vec<f64>,
    pub gene_history: GeneHistory,
    pub generations_run: usize,
    /// The observer asked to stop before the configured generation count.
    pub stopped_early: bool,
}

/// What an [`Observer`] sees after each generation.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub record: &'a GenerationRecord,
    pub total_generations: usize,
    pub score_history: &'a [f64],
    pub gene_history: &'a GeneHistory,
}

/// Receives every completed generation; returning `false` stops the run.
pub trait Observer {
    fn on_generation(&mut self, progress: &Progress<'_>) -> bool;
}

impl<F> Observer for F
where
    F: FnMut(&Progress<'_>) -> bool,
{
    fn on_generation(&mut self, progress: &Progress<'_>) -> bool {
        self(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_history_tracks_each_gene() {
        let mut history = GeneHistory::default();
        assert!(history.is_empty());
        history.push(&Individual::new(60, 1, 2, 3, 4, 5).unwrap());
        history.push(&Individual::new(70, 5, 4, 3, 2, 1).unwrap());
        assert_eq!(history.len(), 2);
        assert_eq!(history.series(Gene::Threshold), &[60, 70]);
        assert_eq!(history.series(Gene::ErodeShape), &[5, 1]);
        assert_eq!(history.iter().count(), 6);
    }
}
