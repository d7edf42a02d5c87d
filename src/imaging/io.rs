use super::pipeline::{CaptchaPipeline, ImageSource};
use crate::fitness::Pipeline;
use crate::individual::Individual;
use image::GrayImage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to write result: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to encode parameters: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paths written by [`save_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResult {
    pub image_path: PathBuf,
    pub parameters_path: PathBuf,
}

#[derive(Serialize)]
struct ParameterFile<'a> {
    name: &'a str,
    score: f64,
    parameters: &'a Individual,
}

/// Writes `<name>_processed.png` and `<name>_params.json` into `dir`,
/// creating it if needed.
pub fn save_result(
    dir: &Path,
    name: &str,
    individual: &Individual,
    score: f64,
    image: &GrayImage,
) -> Result<SavedResult, SaveError> {
    fs::create_dir_all(dir)?;

    let image_path = dir.join(format!("{name}_processed.png"));
    image.save(&image_path)?;

    let parameters_path = dir.join(format!("{name}_params.json"));
    let file = ParameterFile {
        name,
        score,
        parameters: individual,
    };
    fs::write(&parameters_path, serde_json::to_string_pretty(&file)?)?;

    Ok(SavedResult {
        image_path,
        parameters_path,
    })
}

/// One sample written by [`apply_to_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSample {
    pub source: PathBuf,
    pub output: PathBuf,
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
}

/// PNG and JPEG files directly inside `dir`, sorted by path.
pub fn image_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Cleans every image in `samples_dir` with `individual`'s parameters.
///
/// At most `limit` files are processed, in name order. Each result is written
/// to `output_dir` as `processed_<stem>.png`. Files that cannot be decoded are
/// skipped with a warning and left out of the returned list.
pub fn apply_to_dir(
    samples_dir: &Path,
    output_dir: &Path,
    individual: &Individual,
    limit: Option<usize>,
) -> Result<Vec<ProcessedSample>, SaveError> {
    let mut files = image_files(samples_dir)?;
    if let Some(limit) = limit.filter(|&limit| limit < files.len()) {
        log::info!("processing {limit} of {} samples", files.len());
        files.truncate(limit);
    }
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(files.len());
    for source in files {
        let image = match CaptchaPipeline.apply(individual, &ImageSource::path(&source)) {
            Ok(image) => image,
            Err(failure) => {
                log::warn!("skipping sample: {failure}");
                continue;
            }
        };
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(format!("processed_{stem}.png"));
        image.save(&output)?;
        log::debug!("{} -> {}", source.display(), output.display());
        written.push(ProcessedSample { source, output });
    }
    Ok(written)
}
