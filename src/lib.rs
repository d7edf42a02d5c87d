use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub use algorithms::generational::GeneticSearch;
pub use config::GaConfig;
pub use error::{ConfigError, EvaluationFailure, GeneOutOfRange};
pub use fitness::{FailurePolicy, ImageEvaluator, Pipeline, Similarity};
pub use history::{GeneHistory, GenerationRecord, Observer, Progress, RunResult};
pub use individual::{Gene, Individual, create_individual, create_population, mean_parameters};
pub use reproduction::{MutationRate, crossover, mutate};
pub use selection::Selection;

/// The 'DNA' of an individual.
/// Defined by how it is drawn and how it changes.
pub trait Genotype: Clone + Serialize + for<'de> Deserialize<'de> + Send + Sync {
    fn random<R: Rng>(rng: &mut R) -> Self;
    fn mutate<R: Rng>(&mut self, rng: &mut R, rate: MutationRate);
    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self;
}

/// A trait for systems that can score a genotype.
///
/// Must be pure: the controller may call it from several threads at once
/// and in any order.
pub trait Evaluator<G: Genotype>: Send + Sync {
    fn evaluate(&self, genotype: &G) -> Result<f64, EvaluationFailure>;
}

/// Compare two scores, treating NaN as less than all other values.
pub(crate) fn cmp_score_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

pub mod algorithms {
    pub mod generational;
}
pub mod config;
pub mod error;
pub mod fitness;
pub mod history;
#[cfg(feature = "imaging")]
pub mod imaging;
pub mod individual;
pub mod reproduction;
pub mod selection;
