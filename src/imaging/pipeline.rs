use crate::error::EvaluationFailure;
use crate::fitness::Pipeline;
use crate::individual::Individual;
use image::{GrayImage, Luma};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Decoded from disk on every load and converted to grayscale.
    Path(PathBuf),
    Memory(GrayImage),
}

impl ImageSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    pub fn load(&self) -> Result<Cow<'_, GrayImage>, String> {
        match self {
            ImageSource::Path(path) => open_gray(path).map(Cow::Owned),
            ImageSource::Memory(image) => Ok(Cow::Borrowed(image)),
        }
    }
}

impl From<GrayImage> for ImageSource {
    fn from(image: GrayImage) -> Self {
        ImageSource::Memory(image)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

fn open_gray(path: &Path) -> Result<GrayImage, String> {
    image::open(path)
        .map(|img| img.to_luma8())
        .map_err(|e| format!("{}: {e}", path.display()))
}

/// Blur, binary threshold, dilation and erosion, in that order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptchaPipeline;

impl CaptchaPipeline {
    /// Applies all four stages to an in-memory image.
    pub fn process(
        &self,
        individual: &Individual,
        image: &GrayImage,
    ) -> Result<GrayImage, EvaluationFailure> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EvaluationFailure::Stage("cannot process an empty image".into()));
        }
        let blurred = box_blur(image, u32::from(individual.blur()));
        let binary = imageproc::contrast::threshold(&blurred, individual.threshold());
        let dilated = morphology(
            &binary,
            individual.dilate_size(),
            individual.dilate_shape(),
            Morphology::Dilate,
        );
        Ok(morphology(
            &dilated,
            individual.erode_size(),
            individual.erode_shape(),
            Morphology::Erode,
        ))
    }
}

impl Pipeline for CaptchaPipeline {
    type Input = ImageSource;
    type Image = GrayImage;

    fn apply(
        &self,
        individual: &Individual,
        source: &ImageSource,
    ) -> Result<GrayImage, EvaluationFailure> {
        let image = source.load().map_err(EvaluationFailure::SourceUnavailable)?;
        self.process(individual, &image)
    }

    fn load_target(&self, target: &ImageSource) -> Result<GrayImage, EvaluationFailure> {
        target
            .load()
            .map(Cow::into_owned)
            .map_err(EvaluationFailure::TargetUnavailable)
    }
}

/// Offsets covered by a window of `size` with a centred anchor.
fn window(size: u32) -> std::ops::Range<i64> {
    let lo = -i64::from(size / 2);
    lo..lo + i64::from(size)
}

/// Mirror an out-of-range index without repeating the edge pixel.
fn reflect101(i: i64, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let len = i64::from(len);
    let period = 2 * (len - 1);
    let i = i.rem_euclid(period);
    (if i >= len { period - i } else { i }) as u32
}

/// Mean over a `size × size` window, rounded to nearest.
fn box_blur(image: &GrayImage, size: u32) -> GrayImage {
    if size <= 1 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    let mut row_sums = vec![0u32; (w as usize) * (h as usize)];
    for y in 0..h {
        for x in 0..w {
            row_sums[(y * w + x) as usize] = window(size)
                .map(|d| u32::from(image.get_pixel(reflect101(i64::from(x) + d, w), y)[0]))
                .sum();
        }
    }

    let area = size * size;
    GrayImage::from_fn(w, h, |x, y| {
        let sum: u32 = window(size)
            .map(|d| row_sums[(reflect101(i64::from(y) + d, h) * w + x) as usize])
            .sum();
        Luma([((sum + area / 2) / area) as u8])
    })
}

#[derive(Debug, Clone, Copy)]
enum Morphology {
    Dilate,
    Erode,
}

impl Morphology {
    fn identity(self) -> u8 {
        match self {
            Morphology::Dilate => u8::MIN,
            Morphology::Erode => u8::MAX,
        }
    }

    fn combine(self, a: u8, b: u8) -> u8 {
        match self {
            Morphology::Dilate => a.max(b),
            Morphology::Erode => a.min(b),
        }
    }
}

/// Rectangular kernel of `rows × cols`; pixels outside the image are ignored.
fn morphology(image: &GrayImage, rows: u8, cols: u8, op: Morphology) -> GrayImage {
    let horizontal = window_pass(image, u32::from(cols), op, true);
    window_pass(&horizontal, u32::from(rows), op, false)
}

fn window_pass(image: &GrayImage, size: u32, op: Morphology, horizontal: bool) -> GrayImage {
    if size <= 1 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let mut acc = op.identity();
        for d in window(size) {
            let (sx, sy) = if horizontal {
                (i64::from(x) + d, i64::from(y))
            } else {
                (i64::from(x), i64::from(y) + d)
            };
            if (0..i64::from(w)).contains(&sx) && (0..i64::from(h)).contains(&sy) {
                acc = op.combine(acc, image.get_pixel(sx as u32, sy as u32)[0]);
            }
        }
        Luma([acc])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_params(threshold: u8) -> Individual {
        Individual::new(threshold, 1, 1, 1, 1, 1).unwrap()
    }

    #[test]
    fn test_reflect101() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(2, 5), 2);
        assert_eq!(reflect101(-3, 1), 0);
    }

    #[test]
    fn test_box_blur_averages_window() {
        let img = GrayImage::from_raw(3, 1, vec![0, 90, 0]).unwrap();
        let blurred = box_blur(&GrayImage::from_fn(3, 3, |x, _| *img.get_pixel(x, 0)), 3);
        // every window holds one 90 column out of three
        assert_eq!(blurred.get_pixel(1, 1)[0], 30);
        // reflect-101 mirrors the 90 column into the edge windows twice
        assert_eq!(blurred.get_pixel(0, 1)[0], 60);
    }

    #[test]
    fn test_threshold_stage_is_strict() {
        let img = GrayImage::from_raw(3, 1, vec![99, 100, 101]).unwrap();
        let out = CaptchaPipeline.process(&identity_params(100), &img).unwrap();
        assert_eq!(out.as_raw(), &vec![0, 0, 255]);
    }

    #[test]
    fn test_dilate_then_erode_with_rect_kernel() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, Luma([255]));
        // 1 row x 3 cols dilation grows the dot horizontally only
        let dilated = morphology(&img, 1, 3, Morphology::Dilate);
        let lit: Vec<(u32, u32)> = dilated
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == 255)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(lit, vec![(1, 2), (2, 2), (3, 2)]);

        let eroded = morphology(&dilated, 1, 3, Morphology::Erode);
        assert_eq!(eroded.get_pixel(2, 2)[0], 255);
        assert_eq!(eroded.get_pixel(1, 2)[0], 0);
    }

    #[test]
    fn test_even_kernel_anchor() {
        let mut img = GrayImage::new(4, 1);
        img.put_pixel(1, 0, Luma([255]));
        // size 2 covers offsets -1..1, so x=1 and x=2 see the lit pixel
        let dilated = window_pass(&img, 2, Morphology::Dilate, true);
        assert_eq!(dilated.as_raw(), &vec![0, 255, 255, 0]);
    }

    #[test]
    fn test_empty_image_is_stage_failure() {
        let empty = GrayImage::new(0, 0);
        assert!(matches!(
            CaptchaPipeline.process(&identity_params(100), &empty),
            Err(EvaluationFailure::Stage(_))
        ));
    }

    #[test]
    fn test_missing_file_maps_to_source_or_target() {
        let missing = ImageSource::path("/definitely/not/here.png");
        assert!(matches!(
            CaptchaPipeline.apply(&identity_params(100), &missing),
            Err(EvaluationFailure::SourceUnavailable(_))
        ));
        assert!(matches!(
            CaptchaPipeline.load_target(&missing),
            Err(EvaluationFailure::TargetUnavailable(_))
        ));
    }
}
