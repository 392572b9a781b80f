use crate::math::reciprocal_condition;
use crate::HomographyError;
use pitchcal_core::{Mat3, Real};

/// [`reciprocal_condition`] below which a homography is treated as singular.
///
/// Typical pixel → pitch matrices sit around `1e-5`, because the pixel columns
/// are scaled down by the frame size.
pub const SINGULARITY_TOL: Real = 1e-12;

/// Invert a 3x3 homography, failing when it is (numerically) singular.
///
/// The inverse is not rescaled, so `h * inverse` is the identity.
pub fn invert_homography(h: &Mat3) -> Result<Mat3, HomographyError> {
    if reciprocal_condition(h) <= SINGULARITY_TOL {
        return Err(HomographyError::Singular);
    }
    h.try_inverse().ok_or(HomographyError::Singular)
}

/// Largest absolute deviation of `forward * inverse` from the identity.
pub fn inverse_deviation(forward: &Mat3, inverse: &Mat3) -> Real {
    (forward * inverse - Mat3::identity()).amax()
}
