use crate::{CalibrationPointType, Pt2, Real};
use serde::{Deserialize, Serialize};

/// One annotated reference point: where a pitch marking appears in the frame
/// and where it lies on the pitch.
///
/// The label is read from `label` or `point_type`. Labels that name no
/// standard marking become [`CalibrationPointType::Custom`] with the raw text
/// kept in `custom_label`, so a display name never blocks a calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CalibrationPointRepr")]
pub struct CalibrationPoint {
    pub label: CalibrationPointType,
    /// Free-form name for [`CalibrationPointType::Custom`] points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    pub pixel_x: Real,
    pub pixel_y: Real,
    /// Meters from the center spot along the touchlines.
    pub pitch_x: Real,
    /// Meters from the center spot along the goal lines.
    pub pitch_y: Real,
}

#[derive(Deserialize)]
struct CalibrationPointRepr {
    #[serde(default, alias = "point_type")]
    label: Option<String>,
    #[serde(default)]
    custom_label: Option<String>,
    pixel_x: Real,
    pixel_y: Real,
    pitch_x: Real,
    pitch_y: Real,
}

impl From<CalibrationPointRepr> for CalibrationPoint {
    fn from(r: CalibrationPointRepr) -> Self {
        let known = r.label.as_deref().and_then(CalibrationPointType::from_label);
        let (label, custom_label) = match (known, r.label) {
            (Some(label), _) => (label, r.custom_label),
            (None, raw) => (CalibrationPointType::Custom, r.custom_label.or(raw)),
        };
        Self {
            label,
            custom_label,
            pixel_x: r.pixel_x,
            pixel_y: r.pixel_y,
            pitch_x: r.pitch_x,
            pitch_y: r.pitch_y,
        }
    }
}

impl CalibrationPoint {
    pub fn new(label: CalibrationPointType, pixel: Pt2, pitch: Pt2) -> Self {
        Self {
            label,
            custom_label: None,
            pixel_x: pixel.x,
            pixel_y: pixel.y,
            pitch_x: pitch.x,
            pitch_y: pitch.y,
        }
    }

    /// A custom point with a free-form label.
    pub fn custom(name: impl Into<String>, pixel: Pt2, pitch: Pt2) -> Self {
        Self {
            custom_label: Some(name.into()),
            ..Self::new(CalibrationPointType::Custom, pixel, pitch)
        }
    }

    pub fn pixel(&self) -> Pt2 {
        Pt2::new(self.pixel_x, self.pixel_y)
    }

    pub fn pitch(&self) -> Pt2 {
        Pt2::new(self.pitch_x, self.pitch_y)
    }

    pub fn is_finite(&self) -> bool {
        [self.pixel_x, self.pixel_y, self.pitch_x, self.pitch_y]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Label shown to annotators.
    pub fn display_label(&self) -> &str {
        match (&self.label, &self.custom_label) {
            (CalibrationPointType::Custom, Some(name)) => name,
            (label, _) => label.as_str(),
        }
    }
}

/// Split correspondences into `(pixel, pitch)` sequences, preserving order.
pub fn split_correspondences(points: &[CalibrationPoint]) -> (Vec<Pt2>, Vec<Pt2>) {
    points.iter().map(|p| (p.pixel(), p.pitch())).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_format() {
        let json = r#"{
            "label": "penalty_spot_left",
            "pixel_x": 312.5,
            "pixel_y": 540.0,
            "pitch_x": -41.5,
            "pitch_y": 0.0
        }"#;
        let p: CalibrationPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.label, CalibrationPointType::PenaltySpotLeft);
        assert_eq!(p.pixel(), Pt2::new(312.5, 540.0));
        assert_eq!(p.display_label(), "penalty_spot_left");
    }

    #[test]
    fn missing_label_is_custom() {
        let json = r#"{
            "pixel_x": 1, "pixel_y": 2, "pitch_x": 3, "pitch_y": 4,
            "custom_label": "flag"
        }"#;
        let p: CalibrationPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.label, CalibrationPointType::Custom);
        assert_eq!(p.display_label(), "flag");
    }

    #[test]
    fn unknown_label_becomes_custom() {
        let json = r#"{
            "label": "corner",
            "pixel_x": 1, "pixel_y": 2, "pitch_x": 3, "pitch_y": 4
        }"#;
        let p: CalibrationPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.label, CalibrationPointType::Custom);
        assert_eq!(p.custom_label.as_deref(), Some("corner"));
        assert_eq!(p.display_label(), "corner");
    }

    #[test]
    fn point_type_field_is_accepted() {
        let json = r#"{
            "point_type": "goal_post_top_right",
            "pixel_x": 1, "pixel_y": 2, "pitch_x": 52.5, "pitch_y": 3.66
        }"#;
        let p: CalibrationPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.label, CalibrationPointType::GoalPostTopRight);
        assert_eq!(p.custom_label, None);

        let json = r#"{
            "point_type": "corner",
            "pixel_x": 1, "pixel_y": 2, "pitch_x": 3, "pitch_y": 4
        }"#;
        let p: CalibrationPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.label, CalibrationPointType::Custom);
        assert_eq!(p.display_label(), "corner");
    }

    #[test]
    fn explicit_custom_label_wins_over_unknown_type() {
        let json = r#"{
            "label": "flagpost", "custom_label": "north flag",
            "pixel_x": 1, "pixel_y": 2, "pitch_x": 3, "pitch_y": 4
        }"#;
        let p: CalibrationPoint = serde_json::from_str(json).unwrap();
        assert_eq!(p.label, CalibrationPointType::Custom);
        assert_eq!(p.display_label(), "north flag");
    }

    #[test]
    fn serialized_point_reloads() {
        let p = CalibrationPoint::custom("sprinkler", Pt2::new(10.0, 20.0), Pt2::new(-3.0, 4.0));
        let back: CalibrationPoint =
            serde_json::from_str(&serde_json::to_string(&p).unwrap()).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn split_keeps_order() {
        let points = vec![
            CalibrationPoint::new(
                CalibrationPointType::CenterSpot,
                Pt2::new(960.0, 540.0),
                Pt2::new(0.0, 0.0),
            ),
            CalibrationPoint::custom("sprinkler", Pt2::new(10.0, 20.0), Pt2::new(-3.0, 4.0)),
        ];
        let (pixel, pitch) = split_correspondences(&points);
        assert_eq!(pixel, vec![Pt2::new(960.0, 540.0), Pt2::new(10.0, 20.0)]);
        assert_eq!(pitch, vec![Pt2::new(0.0, 0.0), Pt2::new(-3.0, 4.0)]);
        assert!(points.iter().all(CalibrationPoint::is_finite));
    }
}
