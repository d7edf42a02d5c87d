//! Tunes pipeline parameters for every captcha that has a clean counterpart.
//!
//! ```text
//! cargo run --example tune_captchas -- <captcha_dir> <target_dir> [output_dir] [config.json]
//! ```
//!
//! Files are paired by name: `captchas/x7k2.png` is tuned against
//! `targets/x7k2.png`. Each result is written to the output directory, and the
//! per-gene mean of all best parameter sets is printed at the end. Feed any of
//! the written `_params.json` files to the `clean_samples` demo to clean a
//! folder of new captchas with them.

use captcha_genetics::imaging::{
    CaptchaPipeline, Correlation, ImageSource, image_files, save_result,
};
use captcha_genetics::{GaConfig, GeneticSearch, ImageEvaluator, Progress, mean_parameters};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("usage: tune_captchas <captcha_dir> <target_dir> [output_dir] [config.json]");
        return ExitCode::FAILURE;
    }
    let captcha_dir = PathBuf::from(&args[0]);
    let target_dir = PathBuf::from(&args[1]);
    let output_dir = args.get(2).map_or_else(|| PathBuf::from("results"), PathBuf::from);

    let config = match args.get(3) {
        Some(path) => match GaConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("invalid configuration: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => GaConfig::default(),
    };

    let captchas = match image_files(&captcha_dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("cannot list {}: {e}", captcha_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut best_params = Vec::new();
    for captcha in &captchas {
        let Some(file_name) = captcha.file_name() else {
            continue;
        };
        let target = target_dir.join(file_name);
        if !target.exists() {
            log::warn!("no target for {}, skipping", captcha.display());
            continue;
        }
        let stem = captcha
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let evaluator = ImageEvaluator::new(
            CaptchaPipeline,
            Correlation,
            ImageSource::path(captcha),
            ImageSource::path(&target),
        );
        let mut search = match GeneticSearch::new(config.clone()) {
            Ok(search) => search,
            Err(e) => {
                eprintln!("invalid configuration: {e}");
                return ExitCode::FAILURE;
            }
        };

        let result = search.run_with_observer(&evaluator, &mut |p: &Progress<'_>| {
            let done = p.record.generation + 1;
            if done % 10 == 0 || done == p.total_generations {
                log::info!(
                    "{stem}: generation {done}/{} best {:.4} (overall {:.4})",
                    p.total_generations,
                    p.record.best_score,
                    p.record.running_best_score
                );
            }
            true
        });

        let Some(best) = result.best else {
            log::warn!("{stem}: no individual could be scored");
            continue;
        };
        println!("{stem}: {:.4} with {best}", result.best_score);

        match evaluator.source().load() {
            Ok(source) => match CaptchaPipeline.process(&best, &source) {
                Ok(processed) => {
                    let saved =
                        save_result(&output_dir, &stem, &best, result.best_score, &processed);
                    if let Err(e) = saved {
                        log::error!("{stem}: {e}");
                    }
                }
                Err(e) => log::error!("{stem}: {e}"),
            },
            Err(e) => log::error!("{stem}: {e}"),
        }
        best_params.push(best);
    }

    match mean_parameters(&best_params) {
        Some(mean) => {
            println!("mean parameters over {} captchas: {mean}", best_params.len());
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("no captcha could be tuned");
            ExitCode::FAILURE
        }
    }
}
