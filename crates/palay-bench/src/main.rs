//! palay-bench: CLI tool for threshold experimentation and diagnostics.
//!
//! Decodes an image file, runs the tungro detection pipeline with
//! configurable thresholds, and prints either a per-stage diagnostics
//! report or the result record as JSON. Useful for:
//!
//! - Tuning the brightness floor and intensity/area thresholds
//! - Validating the classifier against field photos
//! - Measuring per-stage durations
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin palay-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use palay_pipeline::diagnostics::DetectionDiagnostics;
use palay_pipeline::{DetectorConfig, SystemClock, detect_with_diagnostics};

/// Threshold experimentation and diagnostics for the palay detector.
///
/// Runs the detection pipeline on a given image with configurable
/// thresholds and prints per-stage timing and match diagnostics.
#[derive(Parser)]
#[command(name = "palay-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Brightness floor below which pixels are never plant tissue.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_VALUE_FLOOR)]
    value_floor: u8,

    /// Intensity at or above which tungro is called on intensity alone.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_HIGH_INTENSITY_THRESHOLD)]
    high_intensity_threshold: f64,

    /// Minimum intensity for the moderate-intensity decision path.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_MIN_INTENSITY_SCORE)]
    min_intensity_score: f64,

    /// Minimum yellow area percentage for the moderate-intensity path.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_MIN_AREA_PERCENTAGE)]
    min_area_percentage: f64,

    /// Print the result record as JSON instead of the diagnostics
    /// report.
    #[arg(long)]
    json: bool,

    /// Number of runs for duration averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Full detector config as a JSON string.
    ///
    /// When provided, all other threshold flags are ignored. The JSON
    /// must be a valid `DetectorConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`DetectorConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual threshold flags are ignored. Otherwise, a config is
/// assembled from the individual flags on top of the defaults.
fn config_from_cli(cli: &Cli) -> Result<DetectorConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(DetectorConfig {
        value_floor: cli.value_floor,
        high_intensity_threshold: cli.high_intensity_threshold,
        min_intensity_score: cli.min_intensity_score,
        min_area_percentage: cli.min_area_percentage,
        ..DetectorConfig::default()
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    // Decoding is deliberately the CLI's job: the pipeline itself only
    // ever sees a decoded raster.
    let raster = match image::load_from_memory(&image_bytes) {
        Ok(decoded) => decoded.to_rgb8(),
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({}x{}, {} bytes)",
        cli.image_path.display(),
        raster.width(),
        raster.height(),
        image_bytes.len(),
    );
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match detect_with_diagnostics(&raster, &config, &SystemClock) {
            Ok((result, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&result) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing result: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }
                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Detection error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&DetectionDiagnostics) -> Option<Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[DetectionDiagnostics]) {
    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<18} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(34));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Convert", |d| Some(d.convert.duration)),
        ("Plant Mask", |d| Some(d.mask.duration)),
        ("Yellow Analysis", |d| {
            d.analysis.as_ref().map(|s| s.duration)
        }),
        ("Decision", |d| d.decision.as_ref().map(|s| s.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<18} {stage_mean:>10.3}ms");
    }
}
