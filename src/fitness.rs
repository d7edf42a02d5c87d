//! Fitness evaluation through the pipeline and similarity collaborators.
//!
//! The optimizer never sees images. It hands an [`Individual`] to an
//! [`Evaluator`]; the [`ImageEvaluator`] runs the pipeline on the source and
//! compares the result with the target, which it loads once up front.
//! Failures come back as [`EvaluationFailure`] and are turned into a sentinel
//! score by the run's [`FailurePolicy`], in exactly one place.

use crate::Evaluator;
use crate::error::EvaluationFailure;
use crate::individual::Individual;
use serde::{Deserialize, Serialize};

/// The image transform under tuning.
pub trait Pipeline: Send + Sync {
    /// A reference to an image: a path, an in-memory buffer, a stub.
    type Input: Send + Sync;
    /// The representation both pipeline output and target share.
    type Image: Send + Sync;

    /// Runs every stage with the individual's genes against `source`.
    fn apply(
        &self,
        individual: &Individual,
        source: &Self::Input,
    ) -> Result<Self::Image, EvaluationFailure>;

    /// Obtains the clean reference image.
    fn load_target(&self, target: &Self::Input) -> Result<Self::Image, EvaluationFailure>;
}

/// Similarity between two images, conventionally in `[-1, 1]` with `1` for identical.
pub trait Similarity<I>: Send + Sync {
    fn similarity(&self, a: &I, b: &I) -> Result<f64, EvaluationFailure>;
}

impl<I, F> Similarity<I> for F
where
    F: Fn(&I, &I) -> f64 + Send + Sync,
{
    fn similarity(&self, a: &I, b: &I) -> Result<f64, EvaluationFailure> {
        Ok(self(a, b))
    }
}

/// Score substituted for an individual that could not be evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Failures score `0.0`, the neutral value.
    #[default]
    Zero,
    /// Failures score `-1.0`, the worst possible similarity.
    Worst,
}

impl FailurePolicy {
    pub fn sentinel(self) -> f64 {
        match self {
            FailurePolicy::Zero => 0.0,
            FailurePolicy::Worst => -1.0,
        }
    }

    /// Maps an evaluation outcome to a score.
    ///
    /// Non-finite scores are failures. Failures are logged at trace level.
    pub fn resolve(self, outcome: Result<f64, EvaluationFailure>) -> f64 {
        match outcome.and_then(ensure_finite) {
            Ok(score) => score,
            Err(failure) => {
                log::trace!("{failure}; scoring {}", self.sentinel());
                self.sentinel()
            }
        }
    }
}

pub(crate) fn ensure_finite(score: f64) -> Result<f64, EvaluationFailure> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(EvaluationFailure::NonFiniteScore)
    }
}

/// Evaluates individuals by processing `source` and comparing it to `target`.
///
/// The target is loaded once, in [`ImageEvaluator::new`]. If that fails,
/// every evaluation reports the same `TargetUnavailable` failure.
pub struct ImageEvaluator<P: Pipeline, S> {
    pipeline: P,
    similarity: S,
    source: P::Input,
    target: P::Input,
    target_image: Result<P::Image, EvaluationFailure>,
}

impl<P, S> ImageEvaluator<P, S>
where
    P: Pipeline,
    S: Similarity<P::Image>,
{
    pub fn new(pipeline: P, similarity: S, source: P::Input, target: P::Input) -> Self {
        let target_image = pipeline.load_target(&target);
        if let Err(failure) = &target_image {
            log::warn!("{failure}; every individual will score the failure sentinel");
        }
        Self {
            pipeline,
            similarity,
            source,
            target,
            target_image,
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn source(&self) -> &P::Input {
        &self.source
    }

    pub fn target(&self) -> &P::Input {
        &self.target
    }
}

impl<P, S> Evaluator<Individual> for ImageEvaluator<P, S>
where
    P: Pipeline,
    S: Similarity<P::Image>,
{
    fn evaluate(&self, individual: &Individual) -> Result<f64, EvaluationFailure> {
        let processed = self.pipeline.apply(individual, &self.source)?;
        let target = self.target_image.as_ref().map_err(Clone::clone)?;
        self.similarity.similarity(&processed, target)
    }
}
