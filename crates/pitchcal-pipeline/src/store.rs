//! Per-match calibration records.
//!
//! Records are immutable and shared as `Arc<Calibration>`. A resubmission
//! computes the new record without holding any lock and then swaps it in, so a
//! reader sees either the previous calibration or the new one, never a mix.

use crate::{
    calibrate, Backfill, CalibrationConfig, CalibrationError, CalibrationRequest,
    CalibrationResult, MatchId, UserId,
};
use log::info;
use parking_lot::RwLock;
use pitchcal_core::{CalibrationPoint, Pt2, Real};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A stored calibration: the submitted points and everything derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub match_id: MatchId,
    /// Store-wide counter value at the time of submission.
    pub revision: u64,
    pub points: Vec<CalibrationPoint>,
    pub result: CalibrationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_frame: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibrated_by: Option<UserId>,
}

impl Calibration {
    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    /// Pitch position of a pixel; `None` when invalid or on the horizon.
    pub fn pixel_to_pitch(&self, pixel: &Pt2) -> Option<Pt2> {
        self.result.transform()?.pixel_to_pitch(pixel)
    }

    /// Pixel position of a pitch point; `None` when invalid or on the horizon.
    pub fn pitch_to_pixel(&self, pitch: &Pt2) -> Option<Pt2> {
        self.result.transform()?.pitch_to_pixel(pitch)
    }

    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            match_id: self.match_id,
            is_calibrated: true,
            point_count: self.points.len(),
            is_valid: self.is_valid(),
            reprojection_error: self.result.reprojection_error_m(),
        }
    }
}

/// Summary of a match's calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStatus {
    pub match_id: MatchId,
    /// A calibration record exists, valid or not.
    pub is_calibrated: bool,
    pub point_count: usize,
    pub is_valid: bool,
    pub reprojection_error: Option<Real>,
}

impl CalibrationStatus {
    fn uncalibrated(match_id: MatchId) -> Self {
        Self {
            match_id,
            is_calibrated: false,
            point_count: 0,
            is_valid: false,
            reprojection_error: None,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    records: HashMap<MatchId, Arc<Calibration>>,
    next_revision: u64,
}

/// In-memory calibration store, one record per match.
#[derive(Debug, Default)]
pub struct CalibrationStore {
    config: CalibrationConfig,
    inner: RwLock<StoreInner>,
}

impl CalibrationStore {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrate and store, replacing any previous record for the match.
    ///
    /// Invalid calibrations are stored too, so their points can be corrected.
    /// On `Err` the previous record is left untouched.
    pub fn submit(
        &self,
        match_id: MatchId,
        request: &CalibrationRequest,
        calibrated_by: Option<UserId>,
    ) -> Result<Arc<Calibration>, CalibrationError> {
        let result = calibrate(request, &self.config)?;

        let mut inner = self.inner.write();
        let revision = inner.next_revision;
        inner.next_revision += 1;
        let record = Arc::new(Calibration {
            match_id,
            revision,
            points: request.points.clone(),
            result,
            calibration_frame: request.calibration_frame,
            calibrated_by,
        });
        let replaced = inner.records.insert(match_id, Arc::clone(&record));
        drop(inner);

        let error = record
            .result
            .reprojection_error_m()
            .map_or_else(|| "n/a".to_string(), |e| format!("{e:.4} m"));
        let replaces = replaced
            .map_or_else(String::new, |old| format!(", replaces revision {}", old.revision));
        info!(
            "match {match_id}: calibration revision {revision} stored \
             ({} points, valid: {}, error: {error}){replaces}",
            record.points.len(),
            record.is_valid(),
        );
        Ok(record)
    }

    /// Insert a previously computed record as-is, e.g. when reloading.
    pub fn restore(&self, record: Calibration) -> Arc<Calibration> {
        let mut inner = self.inner.write();
        inner.next_revision = inner.next_revision.max(record.revision.saturating_add(1));
        let record = Arc::new(record);
        inner.records.insert(record.match_id, Arc::clone(&record));
        record
    }

    pub fn get(&self, match_id: MatchId) -> Option<Arc<Calibration>> {
        self.inner.read().records.get(&match_id).cloned()
    }

    pub fn status(&self, match_id: MatchId) -> CalibrationStatus {
        self.get(match_id)
            .map_or_else(|| CalibrationStatus::uncalibrated(match_id), |c| c.status())
    }

    /// The match-level flag: true only while a valid calibration is stored.
    pub fn is_calibrated(&self, match_id: MatchId) -> bool {
        self.get(match_id).is_some_and(|c| c.is_valid())
    }

    /// Delete the calibration of a match. Returns the removed record.
    pub fn remove(&self, match_id: MatchId) -> Option<Arc<Calibration>> {
        let removed = self.inner.write().records.remove(&match_id);
        if let Some(c) = &removed {
            info!("match {match_id}: calibration revision {} deleted", c.revision);
        }
        removed
    }

    /// Drop everything owned by a deleted match.
    pub fn remove_match(&self, match_id: MatchId) {
        if self.inner.write().records.remove(&match_id).is_some() {
            info!("match {match_id} deleted, calibration dropped");
        }
    }

    pub fn pixel_to_pitch(&self, match_id: MatchId, pixel: &Pt2) -> Option<Pt2> {
        self.get(match_id)?.pixel_to_pitch(pixel)
    }

    pub fn pitch_to_pixel(&self, match_id: MatchId, pitch: &Pt2) -> Option<Pt2> {
        self.get(match_id)?.pitch_to_pixel(pitch)
    }

    /// Back-fill items with the match's current calibration.
    ///
    /// The record is read once, so every item is filled by the same revision.
    /// Returns how many items received pitch coordinates.
    pub fn backfill<T: Backfill>(&self, match_id: MatchId, items: &mut [T]) -> usize {
        let calibration = self.get(match_id);
        crate::backfill_all(calibration.as_deref(), items)
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
