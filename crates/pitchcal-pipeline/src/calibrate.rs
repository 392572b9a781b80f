//! Calibration submission: solve, score, invert and judge validity.
//!
//! Input-quality problems (collinear points, a singular fit, an error above
//! [`MAX_VALID_REPROJECTION_ERROR_M`]) never fail the call. They produce an
//! invalid [`CalibrationResult`] with both matrices cleared, so the points can
//! still be stored and corrected. Only fewer than four points or malformed
//! input return a [`CalibrationError`].

use crate::{CalibrationConfig, MAX_VALID_REPROJECTION_ERROR_M};
use log::{debug, warn};
use pitchcal_core::{
    split_correspondences, CalibrationPoint, Mat3, PitchDimensions, PitchDimensionsError, Pt2,
    Real, RowMajor3,
};
use pitchcal_linear::{
    reprojection_stats, Degeneracy, HomographyError, HomographySolver, PitchTransform,
    ReprojectionStats, MIN_CORRESPONDENCES,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("need at least 4 calibration points for homography, got {got}")]
    InsufficientPoints { got: usize },
    #[error("calibration point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("invalid pitch dimensions: {0}")]
    InvalidPitch(#[from] PitchDimensionsError),
    #[error("malformed calibration record: {0}")]
    InvalidRecord(String),
}

/// A calibration submission for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRequest {
    pub points: Vec<CalibrationPoint>,
    /// Per-match touchline length override (meters).
    #[serde(default, alias = "length", skip_serializing_if = "Option::is_none")]
    pub pitch_length: Option<Real>,
    /// Per-match goal line length override (meters).
    #[serde(default, alias = "width", skip_serializing_if = "Option::is_none")]
    pub pitch_width: Option<Real>,
    /// Video frame the points were picked on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_frame: Option<u64>,
}

impl CalibrationRequest {
    pub fn new(points: Vec<CalibrationPoint>) -> Self {
        Self {
            points,
            pitch_length: None,
            pitch_width: None,
            calibration_frame: None,
        }
    }

    /// Dimensions for this request: config defaults with the request's overrides.
    pub fn resolve_pitch(
        &self,
        config: &CalibrationConfig,
    ) -> Result<PitchDimensions, CalibrationError> {
        let pitch = config
            .pitch
            .with_overrides(self.pitch_length, self.pitch_width);
        pitch.validate()?;
        Ok(pitch)
    }

    /// Reject input that cannot be solved at all.
    pub fn check(&self) -> Result<(), CalibrationError> {
        if self.points.len() < MIN_CORRESPONDENCES {
            return Err(CalibrationError::InsufficientPoints {
                got: self.points.len(),
            });
        }
        match self.points.iter().position(|p| !p.is_finite()) {
            Some(index) => Err(CalibrationError::NonFiniteCoordinate { index }),
            None => Ok(()),
        }
    }
}

/// Why a calibration was judged invalid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationFailure {
    /// The points do not determine a homography.
    Degenerate { reason: Degeneracy },
    /// The fitted homography has no usable inverse.
    Singular,
    /// The numerical solve itself failed.
    SolverFailed,
    /// The fit is too poor to be applied.
    ErrorAboveThreshold { error_m: Real, threshold_m: Real },
}

impl std::fmt::Display for CalibrationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Degenerate { reason } => write!(f, "degenerate point configuration: {reason}"),
            Self::Singular => f.write_str("homography is not invertible"),
            Self::SolverFailed => f.write_str("homography solve failed"),
            Self::ErrorAboveThreshold {
                error_m,
                threshold_m,
            } => write!(
                f,
                "mean reprojection error {error_m:.3} m is not below {threshold_m} m"
            ),
        }
    }
}

/// Outcome of a calibration submission.
///
/// Either valid, with a forward/inverse [`PitchTransform`], or invalid with no
/// matrices and a [`CalibrationFailure`]. The reprojection statistics are kept
/// in both cases whenever the solve produced a matrix.
///
/// Serialized as
/// `{ forward_matrix, inverse_matrix, reprojection_error_m, is_valid, ... }`
/// with row-major matrices; deserialization re-checks the invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CalibrationResultRepr", into = "CalibrationResultRepr")]
pub struct CalibrationResult {
    transform: Option<PitchTransform>,
    stats: Option<ReprojectionStats>,
    failure: Option<CalibrationFailure>,
    pitch: PitchDimensions,
}

/// Whether a mean reprojection error passes the validity bar.
pub fn is_acceptable_error(error_m: Real) -> bool {
    error_m < MAX_VALID_REPROJECTION_ERROR_M
}

impl CalibrationResult {
    fn valid(transform: PitchTransform, stats: ReprojectionStats, pitch: PitchDimensions) -> Self {
        Self {
            transform: Some(transform),
            stats: Some(stats),
            failure: None,
            pitch,
        }
    }

    fn invalid(
        failure: CalibrationFailure,
        stats: Option<ReprojectionStats>,
        pitch: PitchDimensions,
    ) -> Self {
        Self {
            transform: None,
            stats,
            failure: Some(failure),
            pitch,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.transform.is_some()
    }

    /// The transform to apply to coordinate data; `None` when invalid.
    pub fn transform(&self) -> Option<&PitchTransform> {
        self.transform.as_ref()
    }

    pub fn forward_matrix(&self) -> Option<RowMajor3> {
        self.transform.map(|t| t.forward_row_major())
    }

    pub fn inverse_matrix(&self) -> Option<RowMajor3> {
        self.transform.map(|t| t.inverse_row_major())
    }

    /// Mean reprojection error in meters, when finite.
    pub fn reprojection_error_m(&self) -> Option<Real> {
        self.stats
            .as_ref()
            .map(|s| s.mean)
            .filter(|e| e.is_finite())
    }

    pub fn stats(&self) -> Option<&ReprojectionStats> {
        self.stats.as_ref()
    }

    pub fn failure(&self) -> Option<&CalibrationFailure> {
        self.failure.as_ref()
    }

    pub fn pitch(&self) -> &PitchDimensions {
        &self.pitch
    }
}

/// Solve, score and judge a calibration request.
///
/// Returns `Err` only for input that must block the submission entirely:
/// fewer than four points, non-finite coordinates or unusable pitch
/// dimensions.
pub fn calibrate(
    request: &CalibrationRequest,
    config: &CalibrationConfig,
) -> Result<CalibrationResult, CalibrationError> {
    request.check()?;
    let pitch = request.resolve_pitch(config)?;

    if !pitch.is_regulation() {
        warn!(
            "pitch dimensions {} x {} m are outside regulation ranges",
            pitch.length, pitch.width
        );
    }
    for p in &request.points {
        if !pitch.contains(&p.pitch(), config.outside_pitch_warning_m) {
            warn!(
                "reference point `{}` at ({:.2}, {:.2}) m lies outside the pitch",
                p.display_label(),
                p.pitch_x,
                p.pitch_y
            );
        }
    }

    let (pixel, pitch_pts) = split_correspondences(&request.points);
    let result = solve(&pixel, &pitch_pts, pitch);
    if let Some(failure) = result.failure() {
        warn!(
            "calibration with {} points is invalid: {failure}",
            request.points.len()
        );
    }
    Ok(result)
}

fn solve(pixel: &[Pt2], pitch_pts: &[Pt2], pitch: PitchDimensions) -> CalibrationResult {
    let h = match HomographySolver::dlt(pixel, pitch_pts) {
        Ok(h) => h,
        Err(err) => {
            debug!("homography solve failed: {err}");
            return CalibrationResult::invalid(solver_failure(err), None, pitch);
        }
    };
    judge(h, pixel, pitch_pts, pitch)
}

/// Score, invert and apply the validity policy to a fitted `pixel -> pitch` matrix.
fn judge(
    h: Mat3,
    pixel: &[Pt2],
    pitch_pts: &[Pt2],
    pitch: PitchDimensions,
) -> CalibrationResult {
    let stats = reprojection_stats(&h, pixel, pitch_pts);
    debug!(
        "reprojection error: mean {:.4} m, max {:.4} m over {} points",
        stats.mean,
        stats.max,
        stats.per_point.len()
    );

    // Invert before judging the error, so a singular fit is reported as such.
    let transform = match PitchTransform::from_forward(h) {
        Ok(t) => t,
        Err(err) => {
            debug!("inverse failed: {err}");
            return CalibrationResult::invalid(solver_failure(err), Some(stats), pitch);
        }
    };

    if !is_acceptable_error(stats.mean) {
        let failure = CalibrationFailure::ErrorAboveThreshold {
            error_m: stats.mean,
            threshold_m: MAX_VALID_REPROJECTION_ERROR_M,
        };
        return CalibrationResult::invalid(failure, Some(stats), pitch);
    }

    CalibrationResult::valid(transform, stats, pitch)
}

fn solver_failure(err: HomographyError) -> CalibrationFailure {
    match err {
        HomographyError::Degenerate(reason) => CalibrationFailure::Degenerate { reason },
        HomographyError::Singular | HomographyError::InconsistentInverse { .. } => {
            CalibrationFailure::Singular
        }
        // Malformed input is rejected by `CalibrationRequest::check` before solving.
        HomographyError::NotEnoughPoints(_)
        | HomographyError::LengthMismatch { .. }
        | HomographyError::NonFinite { .. }
        | HomographyError::SvdFailed => CalibrationFailure::SolverFailed,
    }
}

#[derive(Serialize, Deserialize)]
struct CalibrationResultRepr {
    forward_matrix: Option<RowMajor3>,
    inverse_matrix: Option<RowMajor3>,
    reprojection_error_m: Option<Real>,
    is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_error_m: Option<Real>,
    /// `null` marks a point sent to infinity by the fit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    per_point_errors_m: Vec<Option<Real>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<CalibrationFailure>,
    #[serde(default)]
    pitch: PitchDimensions,
}

fn finite(v: Real) -> Option<Real> {
    Some(v).filter(|v| v.is_finite())
}

impl From<CalibrationResult> for CalibrationResultRepr {
    fn from(r: CalibrationResult) -> Self {
        let reprojection_error_m = r.reprojection_error_m();
        let (max_error_m, per_point_errors_m) = match &r.stats {
            Some(s) => (finite(s.max), s.per_point.iter().map(|&e| finite(e)).collect()),
            None => (None, Vec::new()),
        };
        Self {
            forward_matrix: r.forward_matrix(),
            inverse_matrix: r.inverse_matrix(),
            reprojection_error_m,
            is_valid: r.is_valid(),
            max_error_m,
            per_point_errors_m,
            failure: r.failure,
            pitch: r.pitch,
        }
    }
}

impl TryFrom<CalibrationResultRepr> for CalibrationResult {
    type Error = CalibrationError;

    fn try_from(repr: CalibrationResultRepr) -> Result<Self, Self::Error> {
        let stats = if repr.per_point_errors_m.is_empty() {
            repr.reprojection_error_m.map(|mean| ReprojectionStats {
                mean,
                max: repr.max_error_m.unwrap_or(mean),
                per_point: Vec::new(),
            })
        } else {
            let per_point: Vec<Real> = repr
                .per_point_errors_m
                .iter()
                .map(|e| e.unwrap_or(Real::INFINITY))
                .collect();
            Some(ReprojectionStats {
                mean: repr.reprojection_error_m.unwrap_or(Real::INFINITY),
                max: repr.max_error_m.unwrap_or(Real::INFINITY),
                per_point,
            })
        };

        match (repr.is_valid, repr.forward_matrix, repr.inverse_matrix) {
            (true, Some(forward), Some(inverse)) => {
                let transform = PitchTransform::from_row_major(&forward, &inverse)
                    .map_err(|e| CalibrationError::InvalidRecord(e.to_string()))?;
                let stats = stats
                    .filter(|s| is_acceptable_error(s.mean))
                    .ok_or_else(|| {
                        CalibrationError::InvalidRecord(
                            "valid calibration without an acceptable reprojection error".into(),
                        )
                    })?;
                Ok(Self::valid(transform, stats, repr.pitch))
            }
            (false, None, None) => {
                let failure = repr.failure.unwrap_or(CalibrationFailure::SolverFailed);
                Ok(Self::invalid(failure, stats, repr.pitch))
            }
            _ => Err(CalibrationError::InvalidRecord(
                "matrices must be present exactly when the calibration is valid".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcal_core::{apply_homography, mat3_from_row_major, CalibrationPointType};

    fn request(pairs: &[((Real, Real), (Real, Real))]) -> CalibrationRequest {
        CalibrationRequest::new(
            pairs
                .iter()
                .map(|&((px, py), (mx, my))| {
                    CalibrationPoint::new(
                        CalibrationPointType::Custom,
                        Pt2::new(px, py),
                        Pt2::new(mx, my),
                    )
                })
                .collect(),
        )
    }

    fn uniform_scale() -> CalibrationRequest {
        request(&[
            ((0.0, 0.0), (0.0, 0.0)),
            ((100.0, 0.0), (10.0, 0.0)),
            ((100.0, 100.0), (10.0, 10.0)),
            ((0.0, 100.0), (0.0, 10.0)),
        ])
    }

    #[test]
    fn uniform_scale_is_valid() {
        let result = calibrate(&uniform_scale(), &CalibrationConfig::default()).unwrap();
        assert!(result.is_valid());
        assert!(result.failure().is_none());
        assert!(result.reprojection_error_m().unwrap() < 1e-9);

        let f = result.forward_matrix().unwrap();
        let expected = [0.1, 0.0, 0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 1.0];
        for (a, b) in f.iter().zip(expected) {
            assert!((a - b).abs() < 1e-12, "forward = {f:?}");
        }
        let inv = result.inverse_matrix().unwrap();
        assert!((inv[0] - 10.0).abs() < 1e-9 && (inv[4] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_pitch_points_are_invalid() {
        let req = request(&[
            ((0.0, 0.0), (0.0, 0.0)),
            ((100.0, 0.0), (10.0, 0.0)),
            ((100.0, 100.0), (10.0, 0.0)),
            ((0.0, 100.0), (0.0, 0.0)),
        ]);
        let result = calibrate(&req, &CalibrationConfig::default()).unwrap();
        assert!(!result.is_valid());
        assert!(result.forward_matrix().is_none());
        assert!(result.inverse_matrix().is_none());
        assert!(matches!(
            result.failure(),
            Some(CalibrationFailure::Degenerate { .. })
        ));
    }

    #[test]
    fn three_collinear_pixels_are_rank_deficient() {
        let req = request(&[
            ((0.0, 0.0), (0.0, 0.0)),
            ((50.0, 0.0), (10.0, 0.0)),
            ((100.0, 0.0), (10.0, 10.0)),
            ((0.0, 100.0), (0.0, 10.0)),
        ]);
        let result = calibrate(&req, &CalibrationConfig::default()).unwrap();
        assert!(!result.is_valid());
        assert_eq!(
            result.failure(),
            Some(&CalibrationFailure::Degenerate {
                reason: Degeneracy::RankDeficient
            })
        );
        assert!(result.forward_matrix().is_none());
        assert!(result.inverse_matrix().is_none());
        assert_eq!(result.reprojection_error_m(), None);
    }

    #[test]
    fn three_points_are_rejected() {
        let mut req = uniform_scale();
        req.points.pop();
        assert_eq!(
            calibrate(&req, &CalibrationConfig::default()).unwrap_err(),
            CalibrationError::InsufficientPoints { got: 3 }
        );
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let mut req = uniform_scale();
        req.points[1].pixel_y = Real::INFINITY;
        assert_eq!(
            calibrate(&req, &CalibrationConfig::default()).unwrap_err(),
            CalibrationError::NonFiniteCoordinate { index: 1 }
        );
    }

    #[test]
    fn bad_override_is_rejected() {
        let mut req = uniform_scale();
        req.pitch_width = Some(-68.0);
        assert!(matches!(
            calibrate(&req, &CalibrationConfig::default()).unwrap_err(),
            CalibrationError::InvalidPitch(_)
        ));
    }

    #[test]
    fn overrides_are_recorded() {
        let mut req = uniform_scale();
        req.pitch_length = Some(100.0);
        let result = calibrate(&req, &CalibrationConfig::default()).unwrap();
        assert_eq!(result.pitch().length, 100.0);
        assert_eq!(result.pitch().width, 68.0);
    }

    #[test]
    fn poor_fit_is_invalid_but_keeps_error() {
        // Ten points of a 0.1 scale with two points misplaced by 40 m.
        let mut pairs = Vec::new();
        for i in 0..10 {
            let x = 100.0 * (i % 5) as Real;
            let y = 200.0 * (i / 5) as Real + 13.0 * i as Real;
            pairs.push(((x, y), (0.1 * x, 0.1 * y)));
        }
        pairs[7].1 .0 += 40.0;
        pairs[2].1 .1 -= 40.0;
        let result = calibrate(&request(&pairs), &CalibrationConfig::default()).unwrap();

        assert!(!result.is_valid());
        assert!(result.forward_matrix().is_none());
        let error = result.reprojection_error_m().unwrap();
        assert!(error >= MAX_VALID_REPROJECTION_ERROR_M);
        assert!(matches!(
            result.failure(),
            Some(CalibrationFailure::ErrorAboveThreshold { .. })
        ));
        assert_eq!(result.stats().unwrap().per_point.len(), 10);
    }

    #[test]
    fn singular_fit_is_invalid_with_matrices_cleared() {
        let h = mat3_from_row_major(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0]);
        let pixel = [
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(0.0, 1.0),
            Pt2::new(1.0, 1.0),
        ];
        let pitch_pts: Vec<Pt2> = pixel
            .iter()
            .map(|p| apply_homography(&h, p).unwrap())
            .collect();

        let result = judge(h, &pixel, &pitch_pts, PitchDimensions::default());
        assert!(!result.is_valid());
        assert_eq!(result.failure(), Some(&CalibrationFailure::Singular));
        assert!(result.forward_matrix().is_none());
        assert!(result.inverse_matrix().is_none());
        assert!(result.transform().is_none());
        // The fit itself is exact, so the error stays reported.
        assert!(result.reprojection_error_m().unwrap() < 1e-12);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_valid"], false);
        assert!(json["forward_matrix"].is_null() && json["inverse_matrix"].is_null());
        assert_eq!(json["failure"]["kind"], "singular");
    }

    #[test]
    fn threshold_is_strict() {
        assert!(is_acceptable_error(0.999));
        assert!(!is_acceptable_error(1.0));
        assert!(!is_acceptable_error(Real::NAN));
    }

    #[test]
    fn wire_format_roundtrip() {
        let result = calibrate(&uniform_scale(), &CalibrationConfig::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_valid"], true);
        assert_eq!(json["forward_matrix"].as_array().unwrap().len(), 9);
        assert!(json.get("failure").is_none());

        let back: CalibrationResult = serde_json::from_value(json).unwrap();
        assert!(back.is_valid());
        let (a, b) = (back.forward_matrix().unwrap(), result.forward_matrix().unwrap());
        assert!(a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-15));
    }

    #[test]
    fn invalid_wire_format() {
        let json = serde_json::json!({
            "forward_matrix": null,
            "inverse_matrix": null,
            "reprojection_error_m": null,
            "is_valid": false,
            "failure": { "kind": "degenerate", "reason": "ambiguous_solution" }
        });
        let r: CalibrationResult = serde_json::from_value(json).unwrap();
        assert!(!r.is_valid());
        assert_eq!(
            r.failure(),
            Some(&CalibrationFailure::Degenerate {
                reason: Degeneracy::AmbiguousSolution
            })
        );
    }

    #[test]
    fn inconsistent_record_is_rejected() {
        let json = serde_json::json!({
            "forward_matrix": [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            "inverse_matrix": null,
            "reprojection_error_m": 0.0,
            "is_valid": true
        });
        assert!(serde_json::from_value::<CalibrationResult>(json).is_err());

        let json = serde_json::json!({
            "forward_matrix": [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            "inverse_matrix": [2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            "reprojection_error_m": 0.0,
            "is_valid": true
        });
        assert!(serde_json::from_value::<CalibrationResult>(json).is_err());
    }
}
