use crate::{Pt2, Real};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Regulation ranges for full-size pitches (meters).
pub const REGULATION_LENGTH_RANGE: (Real, Real) = (100.0, 110.0);
pub const REGULATION_WIDTH_RANGE: (Real, Real) = (64.0, 75.0);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PitchDimensionsError {
    #[error("pitch dimension `{name}` must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: Real },
    #[error("{inner} ({inner_size} m) does not fit inside {outer} ({outer_size} m)")]
    DoesNotFit {
        inner: &'static str,
        inner_size: Real,
        outer: &'static str,
        outer_size: Real,
    },
}

/// Pitch and marking dimensions in meters.
///
/// Defaults to FIFA regulation values. A value of this type is resolved once
/// per calibration request and then treated as immutable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchDimensions {
    /// Touchline length.
    pub length: Real,
    /// Goal line length.
    pub width: Real,
    pub penalty_area_length: Real,
    pub penalty_area_width: Real,
    pub goal_area_length: Real,
    pub goal_area_width: Real,
    /// Distance from the goal line to the penalty spot.
    pub penalty_spot_distance: Real,
    pub center_circle_radius: Real,
    pub corner_arc_radius: Real,
    /// Distance between the inside of the goal posts.
    pub goal_width: Real,
}

impl Default for PitchDimensions {
    fn default() -> Self {
        Self {
            length: 105.0,
            width: 68.0,
            penalty_area_length: 16.5,
            penalty_area_width: 40.3,
            goal_area_length: 5.5,
            goal_area_width: 18.3,
            penalty_spot_distance: 11.0,
            center_circle_radius: 9.15,
            corner_arc_radius: 1.0,
            goal_width: 7.32,
        }
    }
}

impl PitchDimensions {
    /// Copy with per-match length / width overrides applied.
    pub fn with_overrides(&self, length: Option<Real>, width: Option<Real>) -> Self {
        Self {
            length: length.unwrap_or(self.length),
            width: width.unwrap_or(self.width),
            ..*self
        }
    }

    pub fn half_length(&self) -> Real {
        0.5 * self.length
    }

    pub fn half_width(&self) -> Real {
        0.5 * self.width
    }

    /// Check that every dimension is usable and the markings fit on the pitch.
    pub fn validate(&self) -> Result<(), PitchDimensionsError> {
        let named = [
            ("length", self.length),
            ("width", self.width),
            ("penalty_area_length", self.penalty_area_length),
            ("penalty_area_width", self.penalty_area_width),
            ("goal_area_length", self.goal_area_length),
            ("goal_area_width", self.goal_area_width),
            ("penalty_spot_distance", self.penalty_spot_distance),
            ("center_circle_radius", self.center_circle_radius),
            ("corner_arc_radius", self.corner_arc_radius),
            ("goal_width", self.goal_width),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(PitchDimensionsError::NotPositive { name, value });
            }
        }

        let fits = [
            (
                "penalty_area_length",
                self.penalty_area_length,
                "half length",
                self.half_length(),
            ),
            ("penalty_area_width", self.penalty_area_width, "width", self.width),
            (
                "goal_area_width",
                self.goal_area_width,
                "penalty_area_width",
                self.penalty_area_width,
            ),
            (
                "goal_area_length",
                self.goal_area_length,
                "penalty_area_length",
                self.penalty_area_length,
            ),
        ];
        for (inner, inner_size, outer, outer_size) in fits {
            if inner_size > outer_size {
                return Err(PitchDimensionsError::DoesNotFit {
                    inner,
                    inner_size,
                    outer,
                    outer_size,
                });
            }
        }
        Ok(())
    }

    /// Whether length and width lie in the regulation ranges for full-size pitches.
    pub fn is_regulation(&self) -> bool {
        let (lmin, lmax) = REGULATION_LENGTH_RANGE;
        let (wmin, wmax) = REGULATION_WIDTH_RANGE;
        (lmin..=lmax).contains(&self.length) && (wmin..=wmax).contains(&self.width)
    }

    /// Whether a pitch point lies inside the field extended by `margin` meters.
    pub fn contains(&self, p: &Pt2, margin: Real) -> bool {
        p.x.abs() <= self.half_length() + margin && p.y.abs() <= self.half_width() + margin
    }

    /// All standard reference points for these dimensions.
    pub fn standard_points(&self) -> Vec<(CalibrationPointType, Pt2)> {
        CalibrationPointType::STANDARD
            .iter()
            .filter_map(|&t| t.standard_coordinates(self).map(|p| (t, p)))
            .collect()
    }
}

/// Semantic label of a calibration reference point.
///
/// Labels are for display only and never influence the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationPointType {
    CornerTopLeft,
    CornerTopRight,
    CornerBottomLeft,
    CornerBottomRight,

    CenterSpot,
    CenterCircleTop,
    CenterCircleBottom,

    PenaltyAreaTopLeft,
    PenaltyAreaBottomLeft,
    PenaltySpotLeft,
    GoalAreaTopLeft,
    GoalAreaBottomLeft,

    PenaltyAreaTopRight,
    PenaltyAreaBottomRight,
    PenaltySpotRight,
    GoalAreaTopRight,
    GoalAreaBottomRight,

    GoalPostTopLeft,
    GoalPostBottomLeft,
    GoalPostTopRight,
    GoalPostBottomRight,

    HalfwayTop,
    HalfwayBottom,

    Custom,
}

impl CalibrationPointType {
    /// Every type with a fixed position on the pitch (all but [`Self::Custom`]).
    pub const STANDARD: [Self; 23] = [
        Self::CornerTopLeft,
        Self::CornerTopRight,
        Self::CornerBottomLeft,
        Self::CornerBottomRight,
        Self::CenterSpot,
        Self::CenterCircleTop,
        Self::CenterCircleBottom,
        Self::PenaltyAreaTopLeft,
        Self::PenaltyAreaBottomLeft,
        Self::PenaltySpotLeft,
        Self::GoalAreaTopLeft,
        Self::GoalAreaBottomLeft,
        Self::PenaltyAreaTopRight,
        Self::PenaltyAreaBottomRight,
        Self::PenaltySpotRight,
        Self::GoalAreaTopRight,
        Self::GoalAreaBottomRight,
        Self::GoalPostTopLeft,
        Self::GoalPostBottomLeft,
        Self::GoalPostTopRight,
        Self::GoalPostBottomRight,
        Self::HalfwayTop,
        Self::HalfwayBottom,
    ];

    /// Parse a wire label such as `"penalty_spot_left"`, ignoring ASCII case.
    ///
    /// Returns `None` for text that names no known type.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::STANDARD
            .into_iter()
            .chain([Self::Custom])
            .find(|t| t.as_str().eq_ignore_ascii_case(label))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CornerTopLeft => "corner_top_left",
            Self::CornerTopRight => "corner_top_right",
            Self::CornerBottomLeft => "corner_bottom_left",
            Self::CornerBottomRight => "corner_bottom_right",
            Self::CenterSpot => "center_spot",
            Self::CenterCircleTop => "center_circle_top",
            Self::CenterCircleBottom => "center_circle_bottom",
            Self::PenaltyAreaTopLeft => "penalty_area_top_left",
            Self::PenaltyAreaBottomLeft => "penalty_area_bottom_left",
            Self::PenaltySpotLeft => "penalty_spot_left",
            Self::GoalAreaTopLeft => "goal_area_top_left",
            Self::GoalAreaBottomLeft => "goal_area_bottom_left",
            Self::PenaltyAreaTopRight => "penalty_area_top_right",
            Self::PenaltyAreaBottomRight => "penalty_area_bottom_right",
            Self::PenaltySpotRight => "penalty_spot_right",
            Self::GoalAreaTopRight => "goal_area_top_right",
            Self::GoalAreaBottomRight => "goal_area_bottom_right",
            Self::GoalPostTopLeft => "goal_post_top_left",
            Self::GoalPostBottomLeft => "goal_post_bottom_left",
            Self::GoalPostTopRight => "goal_post_top_right",
            Self::GoalPostBottomRight => "goal_post_bottom_right",
            Self::HalfwayTop => "halfway_top",
            Self::HalfwayBottom => "halfway_bottom",
            Self::Custom => "custom",
        }
    }

    /// Position of this marking on a pitch with the given dimensions.
    ///
    /// Returns `None` for [`Self::Custom`].
    pub fn standard_coordinates(&self, dims: &PitchDimensions) -> Option<Pt2> {
        let hl = dims.half_length();
        let hw = dims.half_width();
        // Half widths of the boxes, measured from the center line of the pitch.
        let pa_hw = 0.5 * dims.penalty_area_width;
        let ga_hw = 0.5 * dims.goal_area_width;
        let (x, y) = match self {
            Self::CornerTopLeft => (-hl, hw),
            Self::CornerTopRight => (hl, hw),
            Self::CornerBottomLeft => (-hl, -hw),
            Self::CornerBottomRight => (hl, -hw),

            Self::CenterSpot => (0.0, 0.0),
            Self::CenterCircleTop => (0.0, dims.center_circle_radius),
            Self::CenterCircleBottom => (0.0, -dims.center_circle_radius),

            Self::PenaltyAreaTopLeft => (-hl + dims.penalty_area_length, pa_hw),
            Self::PenaltyAreaBottomLeft => (-hl + dims.penalty_area_length, -pa_hw),
            Self::PenaltySpotLeft => (-hl + dims.penalty_spot_distance, 0.0),
            Self::GoalAreaTopLeft => (-hl + dims.goal_area_length, ga_hw),
            Self::GoalAreaBottomLeft => (-hl + dims.goal_area_length, -ga_hw),

            Self::PenaltyAreaTopRight => (hl - dims.penalty_area_length, pa_hw),
            Self::PenaltyAreaBottomRight => (hl - dims.penalty_area_length, -pa_hw),
            Self::PenaltySpotRight => (hl - dims.penalty_spot_distance, 0.0),
            Self::GoalAreaTopRight => (hl - dims.goal_area_length, ga_hw),
            Self::GoalAreaBottomRight => (hl - dims.goal_area_length, -ga_hw),

            Self::GoalPostTopLeft => (-hl, 0.5 * dims.goal_width),
            Self::GoalPostBottomLeft => (-hl, -0.5 * dims.goal_width),
            Self::GoalPostTopRight => (hl, 0.5 * dims.goal_width),
            Self::GoalPostBottomRight => (hl, -0.5 * dims.goal_width),

            Self::HalfwayTop => (0.0, hw),
            Self::HalfwayBottom => (0.0, -hw),

            Self::Custom => return None,
        };
        Some(Pt2::new(x, y))
    }
}

impl std::fmt::Display for CalibrationPointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
