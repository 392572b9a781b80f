use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use pitchcal_core::Pt2;
use pitchcal_pipeline::{calibrate, CalibrationConfig, CalibrationRequest, CalibrationResult};
use serde::Serialize;

/// Pitch calibration from annotated reference points.
#[derive(Debug, Parser)]
#[command(author, version, about = "Football pitch calibration")]
struct Cli {
    /// Log solver details.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a calibration request and print the result as JSON.
    Solve {
        /// JSON file with a CalibrationRequest.
        #[arg(long)]
        input: String,

        /// Optional JSON CalibrationConfig. Defaults are used if omitted.
        #[arg(long)]
        config: Option<String>,
    },
    /// Map one coordinate through a solved calibration.
    Apply {
        /// JSON file with a CalibrationResult, as printed by `solve`.
        #[arg(long)]
        calibration: String,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Map pitch meters to pixels instead of pixels to pitch meters.
        #[arg(long)]
        inverse: bool,
    },
    /// Print the standard reference points for the configured pitch.
    StandardPoints {
        /// Optional JSON CalibrationConfig. Defaults are used if omitted.
        #[arg(long)]
        config: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct MappedPoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct StandardPoint {
    label: &'static str,
    pitch_x: f64,
    pitch_y: f64,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn load_config(path: Option<&str>) -> Result<CalibrationConfig> {
    match path {
        Some(p) => load_json_file(Path::new(p)),
        None => Ok(CalibrationConfig::default()),
    }
}

fn solve_from_files(input_path: &str, config_path: Option<&str>) -> Result<String> {
    let request: CalibrationRequest = load_json_file(Path::new(input_path))?;
    let config = load_config(config_path)?;
    debug!("solving {} reference points", request.points.len());

    let result = calibrate(&request, &config)?;
    if let (true, Some(error)) = (result.is_valid(), result.reprojection_error_m()) {
        info!("calibration is valid, mean error {error:.4} m");
    }
    Ok(serde_json::to_string_pretty(&result)?)
}

fn apply_from_file(calibration_path: &str, point: Pt2, inverse: bool) -> Result<String> {
    let result: CalibrationResult = load_json_file(Path::new(calibration_path))?;
    let Some(transform) = result.transform() else {
        bail!(
            "calibration in {calibration_path} is invalid ({}), nothing to apply",
            result
                .failure()
                .map_or_else(|| "no matrices".to_string(), |f| f.to_string())
        );
    };

    let mapped = if inverse {
        transform.pitch_to_pixel(&point)
    } else {
        transform.pixel_to_pitch(&point)
    };
    let Some(p) = mapped else {
        bail!("({}, {}) maps to a point at infinity", point.x, point.y);
    };
    Ok(serde_json::to_string(&MappedPoint { x: p.x, y: p.y })?)
}

fn standard_points(config_path: Option<&str>) -> Result<String> {
    let config = load_config(config_path)?;
    config.pitch.validate()?;
    let points: Vec<StandardPoint> = config
        .pitch
        .standard_points()
        .into_iter()
        .map(|(label, p)| StandardPoint {
            label: label.as_str(),
            pitch_x: p.x,
            pitch_y: p.y,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&points)?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let out = match &cli.command {
        Command::Solve { input, config } => solve_from_files(input, config.as_deref())?,
        Command::Apply {
            calibration,
            x,
            y,
            inverse,
        } => apply_from_file(calibration, Pt2::new(*x, *y), *inverse)?,
        Command::StandardPoints { config } => standard_points(config.as_deref())?,
    };
    println!("{out}");
    Ok(())
}
