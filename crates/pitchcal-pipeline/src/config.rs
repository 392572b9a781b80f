use pitchcal_core::{PitchDimensions, Real};
use serde::{Deserialize, Serialize};

/// Mean reprojection error (meters) below which a calibration is valid.
///
/// Fixed rather than configurable: every match is judged by the same bar.
pub const MAX_VALID_REPROJECTION_ERROR_M: Real = 1.0;

/// Process-wide calibration settings.
///
/// Passed explicitly into [`calibrate`](crate::calibrate()); nothing here is
/// global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Dimensions used when a request carries no overrides.
    pub pitch: PitchDimensions,
    /// Reference points further than this outside the field are logged as suspicious.
    pub outside_pitch_warning_m: Real,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            pitch: PitchDimensions::default(),
            outside_pitch_warning_m: 5.0,
        }
    }
}
