//! Deterministic noise helpers for synthetic datasets.
//!
//! The functions here avoid `thread_rng` and do not depend on the internal
//! algorithm of `rand` RNGs. This keeps synthetic datasets stable across
//! versions and platforms.

use crate::{Real, Vec2};

/// Deterministic isotropic Gaussian noise with standard deviation `sigma` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianNoise {
    /// Base seed controlling the pseudo-random sequence.
    pub seed: u64,
    /// Per-axis standard deviation, in the units of the perturbed points.
    pub sigma: Real,
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self {
            seed: 0,
            sigma: 0.0,
        }
    }
}

impl GaussianNoise {
    pub fn new(seed: u64, sigma: Real) -> Self {
        Self { seed, sigma }
    }

    /// Sample a deterministic 2D noise vector for point `idx`.
    ///
    /// For a fixed seed the direction of each sample does not depend on
    /// `sigma`, so growing `sigma` scales the same perturbation.
    #[inline]
    pub fn sample(&self, idx: usize) -> Vec2 {
        if self.sigma == 0.0 {
            return Vec2::zeros();
        }
        let key = mix_key(self.seed, idx);
        // Keep u1 away from zero so ln() stays finite.
        let u1 = u64_to_unit_f64(splitmix64(key)).max(Real::MIN_POSITIVE);
        let u2 = u64_to_unit_f64(splitmix64(key ^ 0x94D0_49BB_1331_11EB));

        // Box-Muller.
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        Vec2::new(r * theta.cos(), r * theta.sin()) * self.sigma.abs()
    }
}

#[inline]
fn mix_key(seed: u64, idx: usize) -> u64 {
    seed ^ (idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn u64_to_unit_f64(x: u64) -> Real {
    // Top 53 bits -> [0, 1).
    let mantissa = x >> 11;
    (mantissa as Real) * (1.0 / ((1u64 << 53) as Real))
}
