use crate::error::EvaluationFailure;
use crate::fitness::Similarity;
use image::GrayImage;
use image::imageops::{self, FilterType};
use image_compare::Algorithm;
use std::borrow::Cow;

/// Bilinearly resizes `other` to `reference`'s dimensions when they differ.
fn match_dimensions<'a>(reference: &GrayImage, other: &'a GrayImage) -> Cow<'a, GrayImage> {
    let (w, h) = reference.dimensions();
    if other.dimensions() == (w, h) {
        Cow::Borrowed(other)
    } else {
        Cow::Owned(imageops::resize(other, w, h, FilterType::Triangle))
    }
}

fn ensure_non_empty(image: &GrayImage) -> Result<(), EvaluationFailure> {
    if image.width() == 0 || image.height() == 0 {
        Err(EvaluationFailure::Similarity("cannot compare an empty image".into()))
    } else {
        Ok(())
    }
}

/// Normalized correlation coefficient over all pixels, in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Correlation;

impl Similarity<GrayImage> for Correlation {
    fn similarity(&self, a: &GrayImage, b: &GrayImage) -> Result<f64, EvaluationFailure> {
        ensure_non_empty(a)?;
        ensure_non_empty(b)?;
        let b = match_dimensions(a, b);
        Ok(correlation_coefficient(a.as_raw(), b.as_raw()))
    }
}

/// Pearson correlation of two equally long pixel buffers.
///
/// A constant buffer has no variance; two constant buffers score `1.0` when
/// equal and `0.0` otherwise, as does a constant buffer against a varying one.
pub fn correlation_coefficient(a: &[u8], b: &[u8]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len() as f64;
    let mean = |px: &[u8]| px.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let (mean_a, mean_b) = (mean(a), mean(b));

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = f64::from(x) - mean_a;
        let dy = f64::from(y) - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return if a == b { 1.0 } else { 0.0 };
    }
    (cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0)
}

/// Mean structural similarity (MSSIM) of two grayscale images.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralSimilarity;

impl Similarity<GrayImage> for StructuralSimilarity {
    fn similarity(&self, a: &GrayImage, b: &GrayImage) -> Result<f64, EvaluationFailure> {
        ensure_non_empty(a)?;
        ensure_non_empty(b)?;
        let b = match_dimensions(a, b);
        image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, a, &b)
            .map(|s| s.score)
            .map_err(|e| EvaluationFailure::Similarity(e.to_string()))
    }
}
