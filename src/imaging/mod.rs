//! Concrete collaborators for 8-bit grayscale captcha images.
//!
//! [`CaptchaPipeline`] implements the four-stage transform
//! (blur, threshold, dilate, erode) over [`ImageSource`]s, and
//! [`Correlation`] / [`StructuralSimilarity`] score its output against a
//! clean target. Once tuned, [`apply_to_dir`] cleans a whole folder with the
//! chosen parameters. Plug the collaborators into an
//! [`ImageEvaluator`](crate::ImageEvaluator):
//!
//! ```rust,no_run
//! use captcha_genetics::imaging::{CaptchaPipeline, Correlation, ImageSource};
//! use captcha_genetics::{GaConfig, GeneticSearch, ImageEvaluator};
//!
//! let evaluator = ImageEvaluator::new(
//!     CaptchaPipeline,
//!     Correlation,
//!     ImageSource::path("captchas/abc.png"),
//!     ImageSource::path("targets/abc.png"),
//! );
//! let mut search = GeneticSearch::new(GaConfig::default()).unwrap();
//! let result = search.run(&evaluator);
//! println!("{:?} scored {}", result.best, result.best_score);
//! ```

mod io;
mod pipeline;
mod similarity;

pub use io::{ProcessedSample, SaveError, SavedResult, apply_to_dir, image_files, save_result};
pub use pipeline::{CaptchaPipeline, ImageSource};
pub use similarity::{Correlation, StructuralSimilarity, correlation_coefficient};
