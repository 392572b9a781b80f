//! Deterministic synthetic calibration scenes.
//!
//! Small, reusable building blocks for constructing calibration problems with
//! a known ground truth: a fixed broadcast-style camera view of the pitch,
//! reference point generation and seeded noise.

mod noise;

pub use noise::*;

use crate::{
    apply_homography, CalibrationPoint, CalibrationPointType, Mat3, PitchDimensions, Pt2,
};

/// A synthetic main-camera view: a homography from pitch meters to 1920x1080 pixels.
///
/// The camera sits above the bottom touchline looking across the pitch, so the
/// far (top, `+y`) touchline appears shorter and higher in the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadcastView {
    pub pitch_to_pixel: Mat3,
}

impl Default for BroadcastView {
    fn default() -> Self {
        Self {
            pitch_to_pixel: Mat3::new(
                12.0, 5.76, 960.0, //
                0.0, -5.76, 540.0, //
                0.0, 0.006, 1.0,
            ),
        }
    }
}

impl BroadcastView {
    /// Ground-truth pixel position of a pitch point.
    pub fn pixel_of(&self, pitch: &Pt2) -> Option<Pt2> {
        apply_homography(&self.pitch_to_pixel, pitch)
    }

    /// Ground-truth pixel → pitch homography.
    pub fn pixel_to_pitch(&self) -> Option<Mat3> {
        self.pitch_to_pixel.try_inverse()
    }

    /// Reference points for every standard marking, observed without noise.
    pub fn standard_correspondences(&self, dims: &PitchDimensions) -> Vec<CalibrationPoint> {
        dims.standard_points()
            .into_iter()
            .filter_map(|(label, pitch)| {
                self.pixel_of(&pitch)
                    .map(|pixel| CalibrationPoint::new(label, pixel, pitch))
            })
            .collect()
    }

    /// Correspondences for a subset of markings, observed without noise.
    pub fn correspondences(
        &self,
        dims: &PitchDimensions,
        labels: &[CalibrationPointType],
    ) -> Vec<CalibrationPoint> {
        labels
            .iter()
            .filter_map(|label| {
                let pitch = label.standard_coordinates(dims)?;
                let pixel = self.pixel_of(&pitch)?;
                Some(CalibrationPoint::new(*label, pixel, pitch))
            })
            .collect()
    }
}

/// Perturb the pitch side of every correspondence with the given noise.
pub fn perturb_pitch(points: &[CalibrationPoint], noise: &GaussianNoise) -> Vec<CalibrationPoint> {
    points
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let d = noise.sample(idx);
            CalibrationPoint {
                pitch_x: p.pitch_x + d.x,
                pitch_y: p.pitch_y + d.y,
                ..p.clone()
            }
        })
        .collect()
}
