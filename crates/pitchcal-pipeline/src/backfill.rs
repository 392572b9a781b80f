//! Writing pitch coordinates onto pixel-space tracking data.

use crate::Calibration;
use pitchcal_core::{Pt2, Real};
use serde::{Deserialize, Serialize};

/// Pixel-space data that can carry derived pitch coordinates.
pub trait Backfill {
    /// Recompute pitch coordinates from `calibration`.
    ///
    /// With no calibration, or an invalid one, the coordinates are cleared.
    /// Returns whether coordinates were written.
    fn backfill(&mut self, calibration: Option<&Calibration>) -> bool;
}

/// Back-fill every item with the same calibration; returns how many were filled.
pub fn backfill_all<T: Backfill>(calibration: Option<&Calibration>, items: &mut [T]) -> usize {
    items
        .iter_mut()
        .map(|item| item.backfill(calibration))
        .filter(|&filled| filled)
        .count()
}

fn project(calibration: Option<&Calibration>, pixel: &Pt2) -> Option<Pt2> {
    calibration?.pixel_to_pitch(pixel)
}

/// Axis-aligned bounding box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: Real,
    pub y1: Real,
    pub x2: Real,
    pub y2: Real,
}

impl BoundingBox {
    pub fn center(&self) -> Pt2 {
        Pt2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Bottom center of the box, where a standing player touches the ground.
    pub fn foot(&self) -> Pt2 {
        Pt2::new((self.x1 + self.x2) / 2.0, self.y1.max(self.y2))
    }
}

/// A tracked player or referee in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub frame: u64,
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,
    pub pitch_x: Option<Real>,
    pub pitch_y: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_revision: Option<u64>,
}

impl Detection {
    pub fn new(frame: u64, bbox: BoundingBox) -> Self {
        Self {
            frame,
            bbox,
            track_id: None,
            pitch_x: None,
            pitch_y: None,
            calibration_revision: None,
        }
    }

    pub fn pitch(&self) -> Option<Pt2> {
        Some(Pt2::new(self.pitch_x?, self.pitch_y?))
    }
}

impl Backfill for Detection {
    fn backfill(&mut self, calibration: Option<&Calibration>) -> bool {
        let pitch = project(calibration, &self.bbox.foot());
        self.pitch_x = pitch.map(|p| p.x);
        self.pitch_y = pitch.map(|p| p.y);
        self.calibration_revision = pitch.and(calibration.map(|c| c.revision));
        pitch.is_some()
    }
}

/// Ball position in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallPosition {
    pub frame: u64,
    pub pixel_x: Real,
    pub pixel_y: Real,
    pub pitch_x: Option<Real>,
    pub pitch_y: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_revision: Option<u64>,
}

impl BallPosition {
    pub fn new(frame: u64, pixel: Pt2) -> Self {
        Self {
            frame,
            pixel_x: pixel.x,
            pixel_y: pixel.y,
            pitch_x: None,
            pitch_y: None,
            calibration_revision: None,
        }
    }

    pub fn pitch(&self) -> Option<Pt2> {
        Some(Pt2::new(self.pitch_x?, self.pitch_y?))
    }
}

impl Backfill for BallPosition {
    fn backfill(&mut self, calibration: Option<&Calibration>) -> bool {
        let pitch = project(calibration, &Pt2::new(self.pixel_x, self.pixel_y));
        self.pitch_x = pitch.map(|p| p.x);
        self.pitch_y = pitch.map(|p| p.y);
        self.calibration_revision = pitch.and(calibration.map(|c| c.revision));
        pitch.is_some()
    }
}

/// Start and end of a match event (pass, shot, carry) in pixels, with derived
/// pitch geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLocation {
    pub start_pixel: Option<[Real; 2]>,
    pub end_pixel: Option<[Real; 2]>,
    pub start_pitch: Option<[Real; 2]>,
    pub end_pitch: Option<[Real; 2]>,
    /// Straight-line distance between start and end on the pitch.
    pub distance_m: Option<Real>,
    /// Direction of travel, counter-clockwise from the +x axis, in (-180, 180].
    pub angle_deg: Option<Real>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_revision: Option<u64>,
}

impl EventLocation {
    pub fn new(start: Option<Pt2>, end: Option<Pt2>) -> Self {
        Self {
            start_pixel: start.map(|p| [p.x, p.y]),
            end_pixel: end.map(|p| [p.x, p.y]),
            ..Self::default()
        }
    }
}

impl Backfill for EventLocation {
    fn backfill(&mut self, calibration: Option<&Calibration>) -> bool {
        let map = |px: Option<[Real; 2]>| {
            px.and_then(|[x, y]| project(calibration, &Pt2::new(x, y)))
        };
        let start = map(self.start_pixel);
        let end = map(self.end_pixel);

        self.start_pitch = start.map(|p| [p.x, p.y]);
        self.end_pitch = end.map(|p| [p.x, p.y]);
        (self.distance_m, self.angle_deg) = match (start, end) {
            (Some(a), Some(b)) => {
                let d = b - a;
                (Some(d.norm()), Some(d.y.atan2(d.x).to_degrees()))
            }
            _ => (None, None),
        };

        let filled = start.is_some() || end.is_some();
        self.calibration_revision = if filled {
            calibration.map(|c| c.revision)
        } else {
            None
        };
        filled
    }
}
