//! Core math and pitch-model primitives for `pitchcal`.
//!
//! This crate provides the building blocks shared by the other crates in the
//! workspace:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`, ...) and homogeneous
//!   helpers, including the single pixel → pitch application routine,
//! - the football pitch model (FIFA dimensions and standard reference points),
//! - point correspondence types submitted by annotators,
//! - deterministic synthetic data helpers for tests and benchmarks.
//!
//! Pitch frame: origin at the center spot, `x` along the touchlines (length),
//! `y` along the goal lines (width), meters. The "top" touchline is `+y`.

/// Reference point correspondences.
mod correspondence;
/// Linear algebra type aliases and homogeneous helpers.
mod math;
/// Pitch dimensions and standard reference points.
mod pitch;
/// Deterministic synthetic data generation helpers.
///
/// Used in workspace tests; public so integration suites in other crates can
/// share the same fixtures.
pub mod synthetic;

pub use correspondence::*;
pub use math::*;
pub use pitch::*;
