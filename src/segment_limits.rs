#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{ProfileError, ProfileResult};

/// Per-segment kinematic limits and ramp shaping.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentLimits {
    /// Magnitude of the acceleration used in phases 1-3.
    pub accel_limit: f64,

    /// Magnitude of the acceleration used in phases 5-7.
    pub decel_limit: f64,

    /// Absolute velocity limit that must never be exceeded.
    pub vel_limit: f64,

    /// Length of each quintic sub-ramp of phases 1-3, as a fraction of the
    /// time a pure constant-acceleration ramp would take.
    pub accel_round_frac: f64,

    /// Same as `accel_round_frac`, for phases 5-7.
    pub decel_round_frac: f64,

    /// Fraction of the acceleration limits kept as a floor when a slower
    /// than fastest finish time is requested.
    pub limit_ratio: f64,
}

impl Default for SegmentLimits {
    fn default() -> Self {
        SegmentLimits {
            accel_limit: 1200.0,
            decel_limit: 1200.0,
            vel_limit: 170.0,
            accel_round_frac: 0.0,
            decel_round_frac: 0.0,
            limit_ratio: 1.0,
        }
    }
}

impl SegmentLimits {
    pub fn new(accel_limit: f64, decel_limit: f64, vel_limit: f64) -> Self {
        SegmentLimits {
            accel_limit,
            decel_limit,
            vel_limit,
            ..Default::default()
        }
    }

    pub fn with_rounding(mut self, accel_round_frac: f64, decel_round_frac: f64) -> Self {
        self.accel_round_frac = accel_round_frac;
        self.decel_round_frac = decel_round_frac;
        self
    }

    pub fn with_limit_ratio(mut self, limit_ratio: f64) -> Self {
        self.limit_ratio = limit_ratio;
        self
    }

    pub fn validate(&self) -> ProfileResult<()> {
        Self::check_positive("accel_limit", self.accel_limit)?;
        Self::check_positive("decel_limit", self.decel_limit)?;
        Self::check_positive("vel_limit", self.vel_limit)?;
        Self::check_fraction("accel_round_frac", self.accel_round_frac)?;
        Self::check_fraction("decel_round_frac", self.decel_round_frac)?;
        Self::check_fraction("limit_ratio", self.limit_ratio)
    }

    /// Lowest acceleration the explicit-duration scaling may pick.
    pub(crate) fn accel_floor(&self) -> f64 {
        self.accel_limit * self.limit_ratio
    }

    pub(crate) fn decel_floor(&self) -> f64 {
        self.decel_limit * self.limit_ratio
    }

    fn check_positive(name: &'static str, value: f64) -> ProfileResult<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ProfileError::InvalidLimits {
                name,
                value,
                reason: "must be finite and > 0",
            })
        }
    }

    fn check_fraction(name: &'static str, value: f64) -> ProfileResult<()> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(ProfileError::InvalidLimits {
                name,
                value,
                reason: "must lie in [0, 1]",
            })
        }
    }
}
