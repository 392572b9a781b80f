//! High-level entry crate for the `pitchcal` toolbox.
//!
//! `pitchcal` maps broadcast video pixels to football pitch coordinates in
//! meters. An annotator clicks at least four pitch markings with known
//! positions (corners, penalty spots, the center circle...) on a frame; from
//! these correspondences the library fits a planar homography, scores it,
//! decides whether it is good enough to use and applies it to tracking data.
//!
//! ## One-shot calibration
//!
//! ```
//! use pitchcal::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Pixel positions of four corners, as clicked on a frame.
//! let clicks = [
//!     (CalibrationPointType::CornerTopLeft, Pt2::new(310.0, 180.0)),
//!     (CalibrationPointType::CornerTopRight, Pt2::new(1610.0, 180.0)),
//!     (CalibrationPointType::CornerBottomRight, Pt2::new(1880.0, 1000.0)),
//!     (CalibrationPointType::CornerBottomLeft, Pt2::new(40.0, 1000.0)),
//! ];
//!
//! let config = CalibrationConfig::default();
//! let points = clicks
//!     .iter()
//!     .map(|&(label, pixel)| {
//!         let pitch = label.standard_coordinates(&config.pitch).unwrap();
//!         CalibrationPoint::new(label, pixel, pitch)
//!     })
//!     .collect();
//!
//! let result = calibrate(&CalibrationRequest::new(points), &config)?;
//! assert!(result.is_valid());
//!
//! let transform = result.transform().unwrap();
//! let player = transform.pixel_to_pitch(&Pt2::new(960.0, 600.0)).unwrap();
//! println!("player at ({:.1}, {:.1}) m", player.x, player.y);
//! # Ok(())
//! # }
//! ```
//!
//! ## Per-match store and back-fill
//!
//! ```
//! use pitchcal::pipeline::{BallPosition, CalibrationStore};
//! use pitchcal::prelude::*;
//! use pitchcal::core::synthetic::BroadcastView;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CalibrationStore::default();
//! let view = BroadcastView::default();
//! let points = view.standard_correspondences(&PitchDimensions::default());
//! let request = CalibrationRequest::new(points);
//! store.submit(1, &request, None)?;
//!
//! let mut balls = vec![BallPosition::new(0, Pt2::new(960.0, 540.0))];
//! assert_eq!(store.backfill(1, &mut balls), 1);
//! assert!(balls[0].pitch().unwrap().coords.norm() < 1e-6);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - [`core`]: math aliases, pitch model and reference points, synthetic scenes.
//! - [`linear`]: normalized DLT solver, reprojection scoring, guarded inverse.
//! - [`pipeline`]: validity policy, per-match store, coordinate back-fill.

/// Math types, pitch dimensions and reference point labels.
pub mod core {
    pub use pitchcal_core::*;
}

/// Closed-form homography estimation and its checks.
pub mod linear {
    pub use pitchcal_linear::*;
}

/// Calibration submission, storage and application to tracking data.
pub mod pipeline {
    pub use pitchcal_pipeline::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use pitchcal::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::core::{
        CalibrationPoint, CalibrationPointType, Mat3, PitchDimensions, Pt2, Real,
    };
    pub use crate::linear::{PitchTransform, ReprojectionStats};
    pub use crate::pipeline::{
        calibrate, Backfill, CalibrationConfig, CalibrationError, CalibrationFailure,
        CalibrationRequest, CalibrationResult, CalibrationStatus, CalibrationStore,
    };
}
