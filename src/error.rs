//! Error taxonomy shared by the optimizer and its collaborators.

use crate::individual::Gene;

/// Invalid run parameters. Raised before any generation runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("population size must be at least 1")]
    PopulationTooSmall,
    #[error("generation count must be at least 1")]
    NoGenerations,
    #[error("mutation rate {0} is outside [0, 1]")]
    InvalidMutationRate(f64),
    #[error("tournament size {size} must be in 1..{population}")]
    InvalidTournamentSize { size: usize, population: usize },
    #[error("inconsistent checkpoint: {0}")]
    Checkpoint(String),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A collaborator could not produce a score for one individual.
///
/// Never fatal: the controller maps it to the configured sentinel score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationFailure {
    #[error("source image unavailable: {0}")]
    SourceUnavailable(String),
    #[error("target image unavailable: {0}")]
    TargetUnavailable(String),
    #[error("pipeline stage failed: {0}")]
    Stage(String),
    #[error("similarity metric failed: {0}")]
    Similarity(String),
    #[error("similarity metric returned a non-finite value")]
    NonFiniteScore,
}

/// A gene value outside its declared domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{gene} value {value} is outside its domain")]
pub struct GeneOutOfRange {
    pub gene: Gene,
    pub value: u8,
}
