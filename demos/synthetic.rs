use captcha_genetics::imaging::{CaptchaPipeline, Correlation};
use captcha_genetics::{GaConfig, GeneticSearch, ImageEvaluator, Progress, Selection};
use image::{GrayImage, Luma};

fn clean(w: u32, h: u32) -> GrayImage {
    // Thick diagonal strokes on white
    GrayImage::from_fn(w, h, |x, y| {
        let on_stroke = (x + 2 * y) % 24 < 6 && (6..h - 6).contains(&y);
        Luma([if on_stroke { 0 } else { 255 }])
    })
}

fn noisy(target: &GrayImage) -> GrayImage {
    GrayImage::from_fn(target.width(), target.height(), |x, y| {
        let base = if target.get_pixel(x, y)[0] == 0 { 60 } else { 190 };
        let speck = if base == 190 && (x * 31 + y * 17) % 13 == 0 { 80 } else { 0 };
        Luma([base - speck])
    })
}

fn main() {
    env_logger::init();

    let target = clean(120, 40);
    let source = noisy(&target);
    let evaluator = ImageEvaluator::new(CaptchaPipeline, Correlation, source.into(), target.into());

    let config = GaConfig::default()
        .with_generations(30)
        .with_selection(Selection::tournament())
        .with_seed(42);
    let mut search = GeneticSearch::new(config).expect("default config is valid");

    let result = search.run_with_observer(&evaluator, &mut |p: &Progress<'_>| {
        if p.record.generation % 5 == 0 {
            println!(
                "Gen {}: {:.4} [{}]",
                p.record.generation, p.record.best_score, p.record.best
            );
        }
        // Nothing left to find once the target is reproduced exactly
        p.record.running_best_score < 0.9999
    });

    match result.best {
        Some(best) => println!(
            "Best after {} generations: {:.4} [{best}]",
            result.generations_run, result.best_score
        ),
        None => println!("No individual could be scored"),
    }
}
