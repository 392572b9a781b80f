//! Closed-form estimation of the pixel → pitch homography.
//!
//! - [`HomographySolver`]: normalized Direct Linear Transform with numerical
//!   degeneracy detection,
//! - [`reprojection_stats`]: reprojection error in pitch meters,
//! - [`invert_homography`]: guarded 3x3 inversion,
//! - [`PitchTransform`]: a forward/inverse pair that is always consistent.

mod homography;
mod inverse;
pub mod math;
mod reprojection;
mod transform;

pub use homography::*;
pub use inverse::*;
pub use reprojection::*;
pub use transform::*;
