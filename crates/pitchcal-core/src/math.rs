use nalgebra::{Matrix3, Point2, Vector2, Vector3};

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Pt2 = Point2<Real>;
pub type Mat3 = Matrix3<Real>;

/// Row-major flattening of a 3x3 matrix: `H[0][0], H[0][1], H[0][2], H[1][0], ...`.
///
/// This is the only layout used on the wire; nalgebra's own storage is
/// column-major, so never serialize a [`Mat3`] directly.
pub type RowMajor3 = [Real; 9];

/// Homogeneous coordinates with `|w|` below this are treated as points at infinity.
pub const HOMOGENEOUS_EPS: Real = 1e-12;

pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Dehomogenize, or `None` when the point lies on the line at infinity.
pub fn from_homogeneous(v: &Vec3) -> Option<Pt2> {
    if !v.z.is_finite() || v.z.abs() <= HOMOGENEOUS_EPS {
        return None;
    }
    Some(Pt2::new(v.x / v.z, v.y / v.z))
}

/// Map a point through a homography: `p' = normalize(H · [x, y, 1])`.
///
/// Every conversion between pixel and pitch space in the workspace goes
/// through this function, so that one matrix fully determines all derived
/// coordinates.
#[inline]
pub fn apply_homography(h: &Mat3, p: &Pt2) -> Option<Pt2> {
    from_homogeneous(&(h * to_homogeneous(p)))
}

pub fn mat3_to_row_major(m: &Mat3) -> RowMajor3 {
    let mut out = [0.0; 9];
    for r in 0..3 {
        for c in 0..3 {
            out[3 * r + c] = m[(r, c)];
        }
    }
    out
}

pub fn mat3_from_row_major(values: &RowMajor3) -> Mat3 {
    Mat3::from_row_slice(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout_matches_index_order() {
        let m = Mat3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let flat = mat3_to_row_major(&m);
        assert_eq!(flat, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(mat3_from_row_major(&flat), m);
    }

    #[test]
    fn apply_divides_by_homogeneous_component() {
        let h = Mat3::new(2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 4.0);
        let p = apply_homography(&h, &Pt2::new(3.0, -1.0)).unwrap();
        assert!((p.x - 1.5).abs() < 1e-15);
        assert!((p.y + 0.5).abs() < 1e-15);
    }

    #[test]
    fn point_at_infinity_is_rejected() {
        // Third row sends x = 1 to w = 0.
        let h = Mat3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 1.0);
        assert!(apply_homography(&h, &Pt2::new(1.0, 5.0)).is_none());
        assert!(apply_homography(&h, &Pt2::new(0.5, 5.0)).is_some());
    }
}
