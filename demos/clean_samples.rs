//! Cleans a folder of captchas with an already tuned parameter set.
//!
//! ```text
//! cargo run --example clean_samples -- <samples_dir> <output_dir> <params.json> [limit]
//! ```
//!
//! `params.json` is either a bare parameter object or a `_params.json` file
//! written by `tune_captchas`. A limit of 0 processes every file.

use captcha_genetics::Individual;
use captcha_genetics::imaging::apply_to_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterDocument {
    Saved { parameters: Individual },
    Bare(Individual),
}

fn read_parameters(path: &Path) -> Result<Individual, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    match serde_json::from_str(&text) {
        Ok(ParameterDocument::Saved { parameters }) | Ok(ParameterDocument::Bare(parameters)) => {
            Ok(parameters)
        }
        Err(e) => Err(format!("{}: {e}", path.display())),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: clean_samples <samples_dir> <output_dir> <params.json> [limit]");
        return ExitCode::FAILURE;
    }
    let samples_dir = PathBuf::from(&args[0]);
    let output_dir = PathBuf::from(&args[1]);

    let parameters = match read_parameters(Path::new(&args[2])) {
        Ok(parameters) => parameters,
        Err(e) => {
            eprintln!("invalid parameters: {e}");
            return ExitCode::FAILURE;
        }
    };
    let limit = match args.get(3).map(|s| s.parse::<usize>()) {
        None | Some(Ok(0)) => None,
        Some(Ok(limit)) => Some(limit),
        Some(Err(e)) => {
            eprintln!("invalid limit {:?}: {e}", args[3]);
            return ExitCode::FAILURE;
        }
    };

    println!("cleaning {} with {parameters}", samples_dir.display());
    match apply_to_dir(&samples_dir, &output_dir, &parameters, limit) {
        Ok(written) if written.is_empty() => {
            eprintln!("no image in {} could be processed", samples_dir.display());
            ExitCode::FAILURE
        }
        Ok(written) => {
            for sample in &written {
                println!("{} -> {}", sample.source.display(), sample.output.display());
            }
            println!("{} samples written to {}", written.len(), output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
