//! Generational genetic search with single-elite replacement.
//!
//! # Algorithm
//!
//! Each generation:
//! 1. Scores every individual (in parallel with the `parallel` feature)
//! 2. Picks the generation's best, updating the running best on strict improvement
//! 3. Records history and notifies the observer, which may stop the run
//! 4. Builds the next population: one copy of the best, then children from
//!    selection, uniform crossover and mutation until the size is reached
//!
//! # Determinism
//!
//! All random draws go through one seeded [`Pcg64`]. Evaluation never touches
//! it, so results do not depend on how evaluations are scheduled.
//!
//! # Example
//!
//! ```rust
//! use captcha_genetics::{Evaluator, EvaluationFailure, GaConfig, GeneticSearch, Individual};
//!
//! struct PreferDarkThreshold;
//! impl Evaluator<Individual> for PreferDarkThreshold {
//!     fn evaluate(&self, ind: &Individual) -> Result<f64, EvaluationFailure> {
//!         Ok(1.0 - f64::from(ind.threshold() - 50) / 100.0)
//!     }
//! }
//!
//! let config = GaConfig::default().with_generations(20).with_seed(42);
//! let mut search = GeneticSearch::new(config).unwrap();
//! let result = search.run(&PreferDarkThreshold);
//! assert!(result.best_score > 0.5);
//! ```

use crate::config::GaConfig;
use crate::error::{ConfigError, EvaluationFailure};
use crate::fitness::ensure_finite;
use crate::history::{GeneHistory, GenerationRecord, Observer, Progress, RunResult};
use crate::individual::{Individual, create_population};
use crate::reproduction::{MutationRate, crossover, mutate};
use crate::{Evaluator, cmp_score_nan_last};
use rand::prelude::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The generational controller.
///
/// Serializable between generations, generator state included, so a search
/// can be checkpointed and resumed with identical results. Deserializing
/// re-validates the state the same way [`GeneticSearch::new`] does.
#[derive(Serialize, Deserialize)]
#[serde(try_from = "SearchState")]
pub struct GeneticSearch {
    config: GaConfig,
    #[serde(skip_serializing)]
    mutation_rate: MutationRate,
    seed: u64,
    population: Vec<Individual>,
    generation: usize,
    best: Option<Individual>,
    best_score: f64,
    records: Vec<GenerationRecord>,
    score_history: Vec<f64>,
    gene_history: GeneHistory,
    stopped: bool,
    rng: Pcg64,
}

/// Checkpointed fields as they come off the wire, before validation.
#[derive(Deserialize)]
struct SearchState {
    config: GaConfig,
    seed: u64,
    population: Vec<Individual>,
    generation: usize,
    best: Option<Individual>,
    best_score: f64,
    records: Vec<GenerationRecord>,
    score_history: Vec<f64>,
    gene_history: GeneHistory,
    stopped: bool,
    rng: Pcg64,
}

impl TryFrom<SearchState> for GeneticSearch {
    type Error = ConfigError;

    fn try_from(state: SearchState) -> Result<Self, ConfigError> {
        state.config.validate()?;
        let mutation_rate = state.config.mutation_rate()?;

        if state.population.len() != state.config.population_size {
            return Err(ConfigError::Checkpoint(format!(
                "population holds {} individuals, configuration expects {}",
                state.population.len(),
                state.config.population_size
            )));
        }
        if state.generation > state.config.generations {
            return Err(ConfigError::Checkpoint(format!(
                "generation {} is past the configured {}",
                state.generation, state.config.generations
            )));
        }
        let mut lengths = vec![state.records.len(), state.score_history.len()];
        lengths.extend(state.gene_history.iter().map(|(_, series)| series.len()));
        if lengths.iter().any(|&len| len != state.generation) {
            return Err(ConfigError::Checkpoint(format!(
                "history lengths {lengths:?} do not match {} completed generations",
                state.generation
            )));
        }
        if state.best.is_none() && state.best_score != state.config.failure_policy.sentinel() {
            return Err(ConfigError::Checkpoint(
                "running best score recorded without an individual".into(),
            ));
        }

        Ok(Self {
            config: state.config,
            mutation_rate,
            seed: state.seed,
            population: state.population,
            generation: state.generation,
            best: state.best,
            best_score: state.best_score,
            records: state.records,
            score_history: state.score_history,
            gene_history: state.gene_history,
            stopped: state.stopped,
            rng: state.rng,
        })
    }
}

impl GeneticSearch {
    /// Validates `config`, seeds the generator and creates the initial population.
    pub fn new(config: GaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mutation_rate = config.mutation_rate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg64::seed_from_u64(seed);
        let population = create_population(config.population_size, &mut rng)?;

        log::info!(
            "starting search: {} individuals, {} generations, seed {}",
            config.population_size,
            config.generations,
            seed
        );

        Ok(Self {
            best_score: config.failure_policy.sentinel(),
            config,
            mutation_rate,
            seed,
            population,
            generation: 0,
            best: None,
            records: Vec::new(),
            score_history: Vec::new(),
            gene_history: GeneHistory::default(),
            stopped: false,
            rng,
        })
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// The seed actually used, whether configured or drawn.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The population the next step will evaluate.
    ///
    /// After the final generation this is the last evaluated population.
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn history(&self) -> &[GenerationRecord] {
        &self.records
    }

    pub fn is_finished(&self) -> bool {
        self.stopped || self.generation >= self.config.generations
    }

    /// Runs one generation. Returns `None` once the search is finished.
    pub fn step<E: Evaluator<Individual>>(&mut self, evaluator: &E) -> Option<GenerationRecord> {
        if self.is_finished() {
            return None;
        }
        Some(self.advance(evaluator, &mut |_: &Progress<'_>| true))
    }

    /// Runs every remaining generation.
    pub fn run<E: Evaluator<Individual>>(&mut self, evaluator: &E) -> RunResult {
        self.run_with_observer(evaluator, &mut |_: &Progress<'_>| true)
    }

    /// Runs every remaining generation, reporting each one to `observer`.
    pub fn run_with_observer<E, O>(&mut self, evaluator: &E, observer: &mut O) -> RunResult
    where
        E: Evaluator<Individual>,
        O: Observer + ?Sized,
    {
        while !self.is_finished() {
            self.advance(evaluator, observer);
        }
        log::info!(
            "search finished after {} generations: best score {:.4}",
            self.generation,
            self.best_score
        );
        self.result()
    }

    /// Snapshot of the outcome so far.
    pub fn result(&self) -> RunResult {
        RunResult {
            best: self.best,
            best_score: self.best_score,
            score_history: self.score_history.clone(),
            gene_history: self.gene_history.clone(),
            generations_run: self.generation,
            stopped_early: self.stopped,
        }
    }

    fn advance<E, O>(&mut self, evaluator: &E, observer: &mut O) -> GenerationRecord
    where
        E: Evaluator<Individual>,
        O: Observer + ?Sized,
    {
        let outcomes = self.evaluate_population(evaluator);
        let failures = outcomes.iter().filter(|o| o.is_err()).count();
        let succeeded: Vec<bool> = outcomes.iter().map(Result::is_ok).collect();
        let policy = self.config.failure_policy;
        let scores: Vec<f64> = outcomes.into_iter().map(|o| policy.resolve(o)).collect();

        let best_idx = best_index(&scores, &succeeded);
        let elite = self.population[best_idx];
        let elite_score = scores[best_idx];

        if succeeded[best_idx] && elite_score > self.best_score {
            self.best = Some(elite);
            self.best_score = elite_score;
        }

        let record = GenerationRecord {
            generation: self.generation,
            best: elite,
            best_score: elite_score,
            running_best: self.best,
            running_best_score: self.best_score,
            failures,
        };
        self.score_history.push(elite_score);
        self.gene_history.push(&elite);
        self.records.push(record.clone());
        self.generation += 1;

        log::debug!(
            "generation {}/{}: best {:.4}, running best {:.4}, {} failed",
            self.generation,
            self.config.generations,
            elite_score,
            self.best_score,
            failures
        );

        let progress = Progress {
            record: &record,
            total_generations: self.config.generations,
            score_history: &self.score_history,
            gene_history: &self.gene_history,
        };
        if !observer.on_generation(&progress) {
            log::info!("observer stopped the search at generation {}", record.generation);
            self.stopped = true;
            return record;
        }

        if self.generation < self.config.generations {
            self.reproduce(elite, &scores);
        }
        record
    }

    /// Outcomes come back index-aligned with the population. Non-finite
    /// scores count as failures.
    fn evaluate_population<E: Evaluator<Individual>>(
        &self,
        evaluator: &E,
    ) -> Vec<Result<f64, EvaluationFailure>> {
        #[cfg(feature = "parallel")]
        let outcomes = self
            .population
            .par_iter()
            .map(|ind| evaluator.evaluate(ind).and_then(ensure_finite))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes = self
            .population
            .iter()
            .map(|ind| evaluator.evaluate(ind).and_then(ensure_finite))
            .collect();
        outcomes
    }

    fn reproduce(&mut self, elite: Individual, scores: &[f64]) {
        let size = self.config.population_size;
        let mut next_gen = Vec::with_capacity(size);
        next_gen.push(elite);
        while next_gen.len() < size {
            let (a, b) = self
                .config
                .selection
                .select_parents(&self.population, scores, &mut self.rng);
            let child = crossover(a, b, &mut self.rng);
            next_gen.push(mutate(&child, self.mutation_rate, &mut self.rng));
        }
        self.population = next_gen;
    }
}

/// Index of the strict maximum, first occurrence winning ties.
///
/// Failed individuals rank below every successful one regardless of the
/// sentinel value, so a failure is only chosen when everyone failed.
fn best_index(scores: &[f64], succeeded: &[bool]) -> usize {
    let mut best = 0;
    for i in 1..scores.len() {
        let better = match (succeeded[i], succeeded[best]) {
            (true, false) => true,
            (false, true) => false,
            _ => cmp_score_nan_last(scores[i], scores[best]) == Ordering::Greater,
        };
        if better {
            best = i;
        }
    }
    best
}
