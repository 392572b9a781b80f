//! Match-level pitch calibration.
//!
//! This crate turns a set of annotated reference points into a stored,
//! validated calibration and applies it to pixel-space tracking data:
//!
//! - [`calibrate()`]: solve, score and apply the validity policy,
//! - [`CalibrationStore`]: per-match records replaced atomically,
//! - [`Backfill`]: pitch coordinates for detections, ball positions and events.
//!
//! # Example
//!
//! ```
//! use pitchcal_core::{CalibrationPoint, CalibrationPointType, Pt2};
//! use pitchcal_pipeline::{calibrate, CalibrationConfig, CalibrationRequest};
//!
//! let pixel = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];
//! let points = pixel
//!     .iter()
//!     .map(|&(x, y)| {
//!         CalibrationPoint::new(
//!             CalibrationPointType::Custom,
//!             Pt2::new(x, y),
//!             Pt2::new(0.1 * x, 0.1 * y),
//!         )
//!     })
//!     .collect();
//!
//! let result = calibrate(&CalibrationRequest::new(points), &CalibrationConfig::default())?;
//! assert!(result.is_valid());
//! let pitch = result.transform().unwrap().pixel_to_pitch(&Pt2::new(50.0, 20.0)).unwrap();
//! assert!((pitch.x - 5.0).abs() < 1e-9 && (pitch.y - 2.0).abs() < 1e-9);
//! # Ok::<(), pitchcal_pipeline::CalibrationError>(())
//! ```

mod backfill;
mod calibrate;
mod config;
mod store;

pub use backfill::*;
pub use calibrate::*;
pub use config::*;
pub use store::*;

/// Identifier of a match in the surrounding system.
pub type MatchId = u64;
/// Identifier of the annotator who submitted a calibration.
pub type UserId = u64;
