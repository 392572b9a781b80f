//! Numerical helpers for the linear solvers.
//!
//! # Hartley Normalization
//!
//! Normalizing points before DLT improves numerical stability by centering
//! the data and scaling it to a mean distance of `√2`. Pixel coordinates are in
//! the hundreds to thousands while pitch coordinates are tens of meters;
//! without conditioning the DLT design matrix mixes entries spanning six orders
//! of magnitude.
//!
//! # Example
//!
//! ```
//! use pitchcal_linear::math::normalize_points_2d;
//! use pitchcal_core::Pt2;
//!
//! let points = vec![
//!     Pt2::new(100.0, 200.0),
//!     Pt2::new(150.0, 250.0),
//!     Pt2::new(120.0, 220.0),
//! ];
//!
//! let (normalized, transform) = normalize_points_2d(&points).unwrap();
//! // normalized points have mean at origin, mean distance = sqrt(2)
//! assert_eq!(normalized.len(), 3);
//! assert_eq!(transform[(2, 2)], 1.0);
//! ```

use pitchcal_core::{Mat3, Pt2, Real};

/// Hartley normalization for 2D points.
///
/// Returns the normalized points and the 3x3 transform `T` such that
/// `p_norm = T * p_homogeneous`, or `None` if the input is empty or all points
/// coincide.
///
/// # References
///
/// Hartley & Zisserman, "Multiple View Geometry in Computer Vision", 2nd ed.,
/// Algorithm 4.2 (Normalized DLT)
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as Real;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in points {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0;
    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;

    if mean_dist <= Real::EPSILON * (1.0 + cx.abs().max(cy.abs())) {
        return None;
    }

    let scale = (2.0_f64).sqrt() / mean_dist;
    let t = Mat3::new(
        scale,
        0.0,
        -scale * cx,
        0.0,
        scale,
        -scale * cy,
        0.0,
        0.0,
        1.0,
    );

    let norm = points
        .iter()
        .map(|p| Pt2::new((p.x - cx) * scale, (p.y - cy) * scale))
        .collect();

    Some((norm, t))
}

/// Inverse of a Hartley transform, built in closed form.
pub fn denormalization(t: &Mat3) -> Mat3 {
    let s = t[(0, 0)];
    Mat3::new(
        1.0 / s,
        0.0,
        -t[(0, 2)] / s,
        0.0,
        1.0 / s,
        -t[(1, 2)] / s,
        0.0,
        0.0,
        1.0,
    )
}

/// Reciprocal condition number `σ_min / σ_max` of a 3x3 matrix.
///
/// Lies in `[0, 1]`: `1` for a scaled orthogonal matrix, `0` for a singular
/// one. Invariant to uniform scaling, so it can be applied to an unnormalized
/// DLT solution. Returns `0` for a zero or non-finite matrix.
pub fn reciprocal_condition(m: &Mat3) -> Real {
    if !m.iter().all(|v| v.is_finite()) {
        return 0.0;
    }
    let sv = m.singular_values();
    let s_max = sv.max();
    if s_max <= Real::MIN_POSITIVE {
        return 0.0;
    }
    sv.min() / s_max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_points_are_centered_and_scaled() {
        let points = vec![
            Pt2::new(100.0, 200.0),
            Pt2::new(1800.0, 220.0),
            Pt2::new(1500.0, 900.0),
            Pt2::new(300.0, 1000.0),
        ];
        let (norm, t) = normalize_points_2d(&points).unwrap();

        let cx: Real = norm.iter().map(|p| p.x).sum::<Real>() / 4.0;
        let cy: Real = norm.iter().map(|p| p.y).sum::<Real>() / 4.0;
        let mean_dist: Real = norm.iter().map(|p| p.coords.norm()).sum::<Real>() / 4.0;
        assert!(cx.abs() < 1e-12 && cy.abs() < 1e-12);
        assert!((mean_dist - 2.0_f64.sqrt()).abs() < 1e-12);

        let back = denormalization(&t) * t;
        assert!((back - Mat3::identity()).norm() < 1e-12);
    }

    #[test]
    fn coincident_points_cannot_be_normalized() {
        let points = vec![Pt2::new(5.0, 5.0); 4];
        assert!(normalize_points_2d(&points).is_none());
        assert!(normalize_points_2d(&[]).is_none());
    }

    #[test]
    fn reciprocal_condition_bounds() {
        assert!((reciprocal_condition(&Mat3::identity()) - 1.0).abs() < 1e-15);
        let dependent = Mat3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0);
        assert!(reciprocal_condition(&dependent) < 1e-14);
        assert_eq!(reciprocal_condition(&Mat3::zeros()), 0.0);

        let m = Mat3::new(2.0, 1.0, 0.0, 0.0, 3.0, 1.0, 1.0, 0.0, 1.0);
        let rc = reciprocal_condition(&m);
        assert!(rc > 0.1);
        assert!((reciprocal_condition(&(m * 1e-6)) - rc).abs() < 1e-12);
        assert!((reciprocal_condition(&(-m)) - rc).abs() < 1e-12);
    }
}
