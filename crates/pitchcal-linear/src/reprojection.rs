//! Reprojection error of a homography over a set of correspondences.
//!
//! The residual of a correspondence is the Euclidean distance, in destination
//! units (pitch meters), between `normalize(H · [x, y, 1])` and the known
//! destination point. A source point that `H` sends to infinity has an
//! infinite residual.

use pitchcal_core::{apply_homography, Mat3, Pt2, Real};
use serde::{Deserialize, Serialize};

/// Summary of per-point reprojection residuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReprojectionStats {
    /// Arithmetic mean residual. The calibration quality score.
    pub mean: Real,
    /// Largest residual, for spotting a single misplaced point.
    pub max: Real,
    /// Residual of each correspondence, in input order.
    pub per_point: Vec<Real>,
}

/// Residual of every correspondence, in input order.
pub fn reprojection_residuals(h: &Mat3, src: &[Pt2], dst: &[Pt2]) -> Vec<Real> {
    debug_assert_eq!(src.len(), dst.len());
    src.iter()
        .zip(dst)
        .map(|(s, d)| match apply_homography(h, s) {
            Some(p) => (p - d).norm(),
            None => Real::INFINITY,
        })
        .collect()
}

/// Mean reprojection error. Infinite for an empty set.
pub fn reprojection_error(h: &Mat3, src: &[Pt2], dst: &[Pt2]) -> Real {
    reprojection_stats(h, src, dst).mean
}

pub fn reprojection_stats(h: &Mat3, src: &[Pt2], dst: &[Pt2]) -> ReprojectionStats {
    let per_point = reprojection_residuals(h, src, dst);
    if per_point.is_empty() {
        return ReprojectionStats {
            mean: Real::INFINITY,
            max: Real::INFINITY,
            per_point,
        };
    }
    let mean = per_point.iter().sum::<Real>() / per_point.len() as Real;
    let max = per_point.iter().copied().fold(0.0, Real::max);
    ReprojectionStats {
        mean,
        max,
        per_point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_mapping_has_zero_error() {
        let h = Mat3::new(0.1, 0.0, -5.0, 0.0, 0.1, 2.0, 0.0, 0.0, 1.0);
        let src = vec![Pt2::new(0.0, 0.0), Pt2::new(50.0, 20.0)];
        let dst = vec![Pt2::new(-5.0, 2.0), Pt2::new(0.0, 4.0)];
        let stats = reprojection_stats(&h, &src, &dst);
        assert!(stats.mean < 1e-15);
        assert_eq!(stats.per_point.len(), 2);
    }

    #[test]
    fn mean_and_max_of_known_offsets() {
        let h = Mat3::identity();
        let src = vec![Pt2::new(0.0, 0.0), Pt2::new(1.0, 1.0), Pt2::new(5.0, 5.0)];
        let dst = vec![Pt2::new(3.0, 4.0), Pt2::new(1.0, 1.0), Pt2::new(5.0, 6.0)];
        let stats = reprojection_stats(&h, &src, &dst);
        assert!((stats.mean - 2.0).abs() < 1e-15);
        assert!((stats.max - 5.0).abs() < 1e-15);
        assert_eq!(stats.per_point, vec![5.0, 0.0, 1.0]);
        assert_eq!(reprojection_error(&h, &src, &dst), stats.mean);
    }

    #[test]
    fn point_at_infinity_has_infinite_residual() {
        let h = Mat3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 1.0);
        let src = vec![Pt2::new(1.0, 0.0)];
        let dst = vec![Pt2::new(0.0, 0.0)];
        assert!(reprojection_error(&h, &src, &dst).is_infinite());
    }

    #[test]
    fn empty_set_is_never_a_good_fit() {
        assert!(reprojection_error(&Mat3::identity(), &[], &[]).is_infinite());
    }
}
