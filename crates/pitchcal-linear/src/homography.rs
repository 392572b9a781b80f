//! Homography estimation (plane-induced projective transform).
//!
//! Implements the normalized Direct Linear Transform. The homography `H` maps
//! **pixel points** in a video frame to **pitch points** in meters:
//! `pitch ~ H pixel`.
//!
//! Each correspondence `(x, y) → (u, v)` contributes two rows to a `2N×9`
//! design matrix:
//!
//! ```text
//! [-x, -y, -1,  0,  0,  0, u·x, u·y, u]
//! [ 0,  0,  0, -x, -y, -1, v·x, v·y, v]
//! ```
//!
//! and `h` is the right-singular vector of the smallest singular value.
//! Both point sets are Hartley-normalized before the solve and the result is
//! de-normalized, so the returned matrix acts on raw pixels and meters.

use crate::math::{denormalization, normalize_points_2d, reciprocal_condition};
use log::debug;
use nalgebra::DMatrix;
use pitchcal_core::{Mat3, Pt2, Real};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of correspondences that determine a homography.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Second-smallest singular value, relative to the largest, below which the
/// null space is treated as more than one-dimensional.
pub const NULLSPACE_TOL: Real = 1e-9;

/// [`reciprocal_condition`] of the normalized-frame solution below which it is
/// treated as rank deficient.
pub const RANK_TOL: Real = 1e-9;

/// `|H[2][2]|`, relative to `‖H‖`, below which `H` cannot be normalized.
pub const SCALE_TOL: Real = 1e-12;

/// Why a point configuration does not determine a usable homography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    /// All points on one side coincide.
    CoincidentPoints,
    /// The null space of the design matrix is more than one-dimensional,
    /// e.g. all pixel or all pitch points collinear.
    AmbiguousSolution,
    /// The best-fit matrix maps the plane onto a line or a point.
    RankDeficient,
    /// `H[2][2]` vanishes: the pixel origin maps to infinity.
    UnnormalizableScale,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Degeneracy::CoincidentPoints => "all points coincide",
            Degeneracy::AmbiguousSolution => "points do not determine a unique homography",
            Degeneracy::RankDeficient => "homography is rank deficient",
            Degeneracy::UnnormalizableScale => "H[2][2] is zero",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("point sequences differ in length: {pixel} pixel vs {pitch} pitch points")]
    LengthMismatch { pixel: usize, pitch: usize },
    #[error("correspondence {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("degenerate point configuration: {0}")]
    Degenerate(Degeneracy),
    #[error("homography is not invertible")]
    Singular,
    #[error("forward and inverse matrices disagree (max deviation from identity {deviation:e})")]
    InconsistentInverse { deviation: Real },
    #[error("svd failed")]
    SvdFailed,
}

impl HomographyError {
    /// Whether the error comes from the quality of the points rather than
    /// from malformed input.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            HomographyError::Degenerate(_) | HomographyError::Singular
        )
    }
}

/// High-level entry point for homography estimation.
#[derive(Debug, Clone, Copy)]
pub struct HomographySolver;

/// Estimate `H` such that `pitch ~ H pixel` using normalized DLT.
///
/// The returned homography is scaled so that `H[2][2] == 1`.
pub fn dlt_homography(pixel: &[Pt2], pitch: &[Pt2]) -> Result<Mat3, HomographyError> {
    HomographySolver::dlt(pixel, pitch)
}

impl HomographySolver {
    /// Check the preconditions shared by every solve.
    pub fn check_inputs(pixel: &[Pt2], pitch: &[Pt2]) -> Result<(), HomographyError> {
        if pixel.len() != pitch.len() {
            return Err(HomographyError::LengthMismatch {
                pixel: pixel.len(),
                pitch: pitch.len(),
            });
        }
        if pixel.len() < MIN_CORRESPONDENCES {
            return Err(HomographyError::NotEnoughPoints(pixel.len()));
        }
        let bad = pixel
            .iter()
            .zip(pitch)
            .position(|(a, b)| !(is_finite(a) && is_finite(b)));
        match bad {
            Some(index) => Err(HomographyError::NonFinite { index }),
            None => Ok(()),
        }
    }

    /// Estimate a homography `H` such that `pitch ~ H pixel`.
    ///
    /// Fails with [`HomographyError::Degenerate`] when the configuration does
    /// not pin down a single invertible `H` (coincident or collinear points,
    /// too many points on one line) or when `H[2][2]` vanishes.
    pub fn dlt(pixel: &[Pt2], pitch: &[Pt2]) -> Result<Mat3, HomographyError> {
        Self::check_inputs(pixel, pitch)?;
        let n = pixel.len();

        let (src_n, t_src) = normalize_points_2d(pixel)
            .ok_or(HomographyError::Degenerate(Degeneracy::CoincidentPoints))?;
        let (dst_n, t_dst) = normalize_points_2d(pitch)
            .ok_or(HomographyError::Degenerate(Degeneracy::CoincidentPoints))?;

        // With four points A is 8x9; pad with zero rows so the SVD yields a full V.
        let rows = (2 * n).max(9);
        let mut a = DMatrix::<Real>::zeros(rows, 9);

        for (i, (ps, pd)) in src_n.iter().zip(dst_n.iter()).enumerate() {
            let x = ps.x;
            let y = ps.y;
            let u = pd.x;
            let v = pd.y;

            let r0 = 2 * i;
            let r1 = 2 * i + 1;

            a[(r0, 0)] = -x;
            a[(r0, 1)] = -y;
            a[(r0, 2)] = -1.0;
            a[(r0, 6)] = u * x;
            a[(r0, 7)] = u * y;
            a[(r0, 8)] = u;

            a[(r1, 3)] = -x;
            a[(r1, 4)] = -y;
            a[(r1, 5)] = -1.0;
            a[(r1, 6)] = v * x;
            a[(r1, 7)] = v * y;
            a[(r1, 8)] = v;
        }

        let svd = a.svd(false, true);
        let v_t = svd.v_t.ok_or(HomographyError::SvdFailed)?;
        let sv = &svd.singular_values;

        // Rows of V^T follow the singular value order; sort indices rather than
        // relying on the decomposition's ordering.
        let mut order: Vec<usize> = (0..sv.len()).collect();
        order.sort_by(|&i, &j| sv[i].total_cmp(&sv[j]));
        let smallest = order[0];
        let second = order[1];
        let largest = order[order.len() - 1];

        let s_max = sv[largest];
        debug!(
            "dlt: n = {}, sigma_min = {:e}, sigma_2 = {:e}, sigma_max = {:e}",
            n, sv[smallest], sv[second], s_max
        );
        if !(s_max.is_finite() && s_max > 0.0) {
            return Err(HomographyError::SvdFailed);
        }
        if sv[second] <= NULLSPACE_TOL * s_max {
            return Err(HomographyError::Degenerate(Degeneracy::AmbiguousSolution));
        }

        let h_vec = v_t.row(smallest);
        let mut h_n = Mat3::zeros();
        for r in 0..3 {
            for c in 0..3 {
                h_n[(r, c)] = h_vec[3 * r + c];
            }
        }

        let rcond = reciprocal_condition(&h_n);
        if rcond <= RANK_TOL {
            debug!("dlt: rank deficient solution (rcond {:e})", rcond);
            return Err(HomographyError::Degenerate(Degeneracy::RankDeficient));
        }

        let h = denormalization(&t_dst) * h_n * t_src;

        // normalise such that H[2,2] = 1; this also fixes the SVD sign.
        let scale = h[(2, 2)];
        if !scale.is_finite() || scale.abs() <= SCALE_TOL * h.norm() {
            return Err(HomographyError::Degenerate(Degeneracy::UnnormalizableScale));
        }

        Ok(h / scale)
    }
}

fn is_finite(p: &Pt2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Pt2> {
        vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(100.0, 0.0),
            Pt2::new(100.0, 100.0),
            Pt2::new(0.0, 100.0),
        ]
    }

    #[test]
    fn uniform_scale() {
        let pixel = unit_square();
        let pitch: Vec<Pt2> = pixel.iter().map(|p| Pt2::from(p.coords * 0.1)).collect();

        let h = dlt_homography(&pixel, &pitch).unwrap();
        let expected = Mat3::new(0.1, 0.0, 0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 1.0);
        assert!((h - expected).amax() < 1e-12, "h = {h}");
        assert_eq!(h[(2, 2)], 1.0);
    }

    #[test]
    fn too_few_points() {
        let pixel = unit_square();
        let err = dlt_homography(&pixel[..3], &pixel[..3]).unwrap_err();
        assert_eq!(err, HomographyError::NotEnoughPoints(3));
        assert!(!err.is_degenerate());
    }

    #[test]
    fn mismatched_lengths() {
        let pixel = unit_square();
        let err = dlt_homography(&pixel, &pixel[..3]).unwrap_err();
        assert_eq!(err, HomographyError::LengthMismatch { pixel: 4, pitch: 3 });
    }

    #[test]
    fn non_finite_coordinate() {
        let pixel = unit_square();
        let mut pitch = pixel.clone();
        pitch[2].y = Real::NAN;
        let err = dlt_homography(&pixel, &pitch).unwrap_err();
        assert_eq!(err, HomographyError::NonFinite { index: 2 });
    }

    #[test]
    fn collinear_destination_is_degenerate() {
        let pixel = unit_square();
        let pitch = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(10.0, 0.0),
            Pt2::new(10.0, 0.0),
            Pt2::new(0.0, 0.0),
        ];
        let err = dlt_homography(&pixel, &pitch).unwrap_err();
        assert!(err.is_degenerate(), "unexpected error {err:?}");
    }

    #[test]
    fn collinear_source_is_degenerate() {
        let pixel: Vec<Pt2> = (0..5)
            .map(|i| Pt2::new(10.0 * i as Real, 5.0 * i as Real))
            .collect();
        let pitch = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(10.0, 0.0),
            Pt2::new(10.0, 10.0),
            Pt2::new(0.0, 10.0),
            Pt2::new(5.0, 5.0),
        ];
        let err = dlt_homography(&pixel, &pitch).unwrap_err();
        assert!(err.is_degenerate(), "unexpected error {err:?}");
    }

    #[test]
    fn three_collinear_sources_are_rank_deficient() {
        // Only a rank-one matrix sends the pixel line onto three non-collinear
        // pitch points, so the null space is unique but unusable.
        let pixel = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(50.0, 0.0),
            Pt2::new(100.0, 0.0),
            Pt2::new(0.0, 100.0),
        ];
        let pitch = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(10.0, 0.0),
            Pt2::new(10.0, 10.0),
            Pt2::new(0.0, 10.0),
        ];
        assert_eq!(
            dlt_homography(&pixel, &pitch).unwrap_err(),
            HomographyError::Degenerate(Degeneracy::RankDeficient)
        );
    }

    #[test]
    fn coincident_points() {
        let pixel = vec![Pt2::new(3.0, 4.0); 4];
        let pitch = unit_square();
        assert_eq!(
            dlt_homography(&pixel, &pitch).unwrap_err(),
            HomographyError::Degenerate(Degeneracy::CoincidentPoints)
        );
    }

    #[test]
    fn solve_is_deterministic() {
        let pixel = vec![
            Pt2::new(210.0, 880.0),
            Pt2::new(1700.0, 860.0),
            Pt2::new(1400.0, 300.0),
            Pt2::new(500.0, 310.0),
            Pt2::new(960.0, 520.0),
        ];
        let pitch = vec![
            Pt2::new(-52.5, -34.0),
            Pt2::new(52.5, -34.0),
            Pt2::new(52.5, 34.0),
            Pt2::new(-52.5, 34.0),
            Pt2::new(0.0, 0.0),
        ];
        let a = dlt_homography(&pixel, &pitch).unwrap();
        let b = dlt_homography(&pixel, &pitch).unwrap();
        assert_eq!(a, b);
    }
}
