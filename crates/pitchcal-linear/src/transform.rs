use crate::{invert_homography, inverse_deviation, HomographyError};
use pitchcal_core::{
    apply_homography, mat3_from_row_major, mat3_to_row_major, Mat3, Pt2, Real, RowMajor3,
};
use serde::{Deserialize, Serialize};

/// Largest tolerated deviation of `forward * inverse` from the identity when a
/// transform is rebuilt from stored matrices.
pub const INVERSE_CONSISTENCY_TOL: Real = 1e-6;

/// Forward (pixel → pitch) and inverse (pitch → pixel) homographies.
///
/// The pair is only constructible with matching matrices, so holding a
/// `PitchTransform` means both directions are usable. It serializes as two
/// row-major `[f64; 9]` arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransformRepr", into = "TransformRepr")]
pub struct PitchTransform {
    forward: Mat3,
    inverse: Mat3,
}

#[derive(Serialize, Deserialize)]
struct TransformRepr {
    forward_matrix: RowMajor3,
    inverse_matrix: RowMajor3,
}

impl PitchTransform {
    /// Build from a forward homography, computing its inverse.
    pub fn from_forward(forward: Mat3) -> Result<Self, HomographyError> {
        let inverse = invert_homography(&forward)?;
        Ok(Self { forward, inverse })
    }

    /// Rebuild from stored row-major matrices, checking that they are inverses.
    pub fn from_row_major(
        forward: &RowMajor3,
        inverse: &RowMajor3,
    ) -> Result<Self, HomographyError> {
        let forward = mat3_from_row_major(forward);
        let inverse = mat3_from_row_major(inverse);
        let deviation = inverse_deviation(&forward, &inverse);
        if !(deviation <= INVERSE_CONSISTENCY_TOL) {
            return Err(HomographyError::InconsistentInverse { deviation });
        }
        Ok(Self { forward, inverse })
    }

    pub fn forward(&self) -> &Mat3 {
        &self.forward
    }

    pub fn inverse(&self) -> &Mat3 {
        &self.inverse
    }

    pub fn forward_row_major(&self) -> RowMajor3 {
        mat3_to_row_major(&self.forward)
    }

    pub fn inverse_row_major(&self) -> RowMajor3 {
        mat3_to_row_major(&self.inverse)
    }

    /// Pitch position (meters) of a pixel, `None` if it lies on the horizon.
    #[inline]
    pub fn pixel_to_pitch(&self, pixel: &Pt2) -> Option<Pt2> {
        apply_homography(&self.forward, pixel)
    }

    /// Pixel position of a pitch point, for drawing overlays on the frame.
    #[inline]
    pub fn pitch_to_pixel(&self, pitch: &Pt2) -> Option<Pt2> {
        apply_homography(&self.inverse, pitch)
    }
}

impl From<PitchTransform> for TransformRepr {
    fn from(t: PitchTransform) -> Self {
        Self {
            forward_matrix: t.forward_row_major(),
            inverse_matrix: t.inverse_row_major(),
        }
    }
}

impl TryFrom<TransformRepr> for PitchTransform {
    type Error = HomographyError;

    fn try_from(repr: TransformRepr) -> Result<Self, Self::Error> {
        Self::from_row_major(&repr.forward_matrix, &repr.inverse_matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PitchTransform {
        let h = Mat3::new(
            0.130_208_333_333_333_33,
            0.0,
            -125.0,
            0.0,
            -0.173_611_111_111_111_1,
            93.75,
            0.0,
            0.001_041_666_666_666_666_7,
            1.0,
        );
        PitchTransform::from_forward(h).unwrap()
    }

    #[test]
    fn serializes_row_major() {
        let t = sample();
        let json = serde_json::to_value(t).unwrap();
        let forward: Vec<Real> = serde_json::from_value(json["forward_matrix"].clone()).unwrap();
        assert_eq!(forward[2], -125.0);
        assert_eq!(forward[5], 93.75);
        assert_eq!(forward[8], 1.0);

        let back: PitchTransform = serde_json::from_value(json).unwrap();
        assert!((back.forward() - t.forward()).amax() < 1e-15);
    }

    #[test]
    fn rejects_mismatched_pair() {
        let t = sample();
        let mut inverse = t.inverse_row_major();
        inverse[0] *= 2.0;
        let err = PitchTransform::from_row_major(&t.forward_row_major(), &inverse).unwrap_err();
        assert!(matches!(err, HomographyError::InconsistentInverse { .. }));
    }

    #[test]
    fn pixel_pitch_roundtrip() {
        let t = sample();
        let pixel = Pt2::new(1337.0, 642.0);
        let pitch = t.pixel_to_pitch(&pixel).unwrap();
        let back = t.pitch_to_pixel(&pitch).unwrap();
        assert!((back - pixel).norm() < 1e-9);
    }
}
