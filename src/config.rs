//! Run configuration.
//!
//! Every field has a default, so a partial JSON document such as
//! `{"generations": 10, "selection": {"type": "tournament"}}` is complete.

use crate::error::ConfigError;
use crate::fitness::FailurePolicy;
use crate::reproduction::MutationRate;
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options recognized by [`GeneticSearch`](crate::algorithms::generational::GeneticSearch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation. Must be at least 1.
    pub population_size: usize,
    /// Generations to run. Must be at least 1.
    pub generations: usize,
    /// Per-gene mutation probability in `[0, 1]`.
    pub mutation_rate: f64,
    pub selection: Selection,
    /// Seed for the run's generator. `None` draws one at startup.
    pub seed: Option<u64>,
    pub failure_policy: FailurePolicy,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 50,
            mutation_rate: MutationRate::default().get(),
            selection: Selection::default(),
            seed: None,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Checks every option; returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 1 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if self.generations < 1 {
            return Err(ConfigError::NoGenerations);
        }
        MutationRate::new(self.mutation_rate)?;
        if let Selection::Tournament { size } = self.selection {
            if size < 1 || size >= self.population_size {
                return Err(ConfigError::InvalidTournamentSize {
                    size,
                    population: self.population_size,
                });
            }
        }
        Ok(())
    }

    /// The validated mutation rate.
    pub fn mutation_rate(&self) -> Result<MutationRate, ConfigError> {
        MutationRate::new(self.mutation_rate)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 20);
        assert_eq!(config.generations, 50);
        assert_eq!(config.mutation_rate, 0.2);
        assert_eq!(config.selection, Selection::Roulette);
        assert_eq!(config.failure_policy, FailurePolicy::Zero);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_each_bad_option() {
        let base = GaConfig::default();
        assert!(matches!(
            base.clone().with_population_size(0).validate(),
            Err(ConfigError::PopulationTooSmall)
        ));
        assert!(matches!(
            base.clone().with_generations(0).validate(),
            Err(ConfigError::NoGenerations)
        ));
        assert!(matches!(
            base.clone().with_mutation_rate(1.5).validate(),
            Err(ConfigError::InvalidMutationRate(_))
        ));
        assert!(matches!(
            base.clone()
                .with_population_size(3)
                .with_selection(Selection::tournament())
                .validate(),
            Err(ConfigError::InvalidTournamentSize { size: 3, population: 3 })
        ));
        assert!(matches!(
            base.with_selection(Selection::Tournament { size: 0 }).validate(),
            Err(ConfigError::InvalidTournamentSize { .. })
        ));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "generations": 5,
            "selection": {"type": "tournament", "size": 4},
            "failure_policy": "worst"
        }"#;
        let config = GaConfig::from_json_str(json).unwrap();
        assert_eq!(config.generations, 5);
        assert_eq!(config.population_size, 20);
        assert_eq!(config.selection, Selection::Tournament { size: 4 });
        assert_eq!(config.failure_policy, FailurePolicy::Worst);
    }

    #[test]
    fn test_json_validation_runs() {
        assert!(matches!(
            GaConfig::from_json_str(r#"{"mutation_rate": -0.5}"#),
            Err(ConfigError::InvalidMutationRate(_))
        ));
        assert!(matches!(
            GaConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
