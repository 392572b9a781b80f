//! Calibrate a synthetic broadcast view with increasing annotation noise.
//!
//! Shows how the reprojection error grows with click inaccuracy and where the
//! validity threshold starts rejecting calibrations.
//!
//! Run with: `cargo run -p pitchcal --example broadcast_synthetic`

use anyhow::Result;
use pitchcal::core::synthetic::{perturb_pitch, BroadcastView, GaussianNoise};
use pitchcal::prelude::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = CalibrationConfig::default();
    let view = BroadcastView::default();
    let clean = view.standard_correspondences(&config.pitch);
    println!("=== Broadcast view, {} reference points ===\n", clean.len());

    let spot_pitch = Pt2::new(-41.5, 0.0);
    let Some(spot_pixel) = view.pixel_of(&spot_pitch) else {
        anyhow::bail!("penalty spot is not visible");
    };

    for sigma in [0.0, 0.1, 0.3, 0.6, 1.0, 2.0] {
        let points = perturb_pitch(&clean, &GaussianNoise::new(2024, sigma));
        let result = calibrate(&CalibrationRequest::new(points), &config)?;

        let error = result
            .reprojection_error_m()
            .map_or_else(|| "n/a".to_string(), |e| format!("{e:.3} m"));
        match result.transform() {
            Some(t) => {
                let spot = t.pixel_to_pitch(&spot_pixel);
                let miss = spot.map(|p| (p - spot_pitch).norm());
                println!(
                    "sigma {sigma:.1} m: valid,   error {error}, penalty spot off by {:.3} m",
                    miss.unwrap_or(f64::NAN)
                );
            }
            None => {
                let why = result.failure().map(|f| f.to_string()).unwrap_or_default();
                println!("sigma {sigma:.1} m: invalid, error {error} ({why})");
            }
        }
    }

    let result = calibrate(&CalibrationRequest::new(clean), &config)?;
    println!("\nClean calibration:\n{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
