//! Reward schedule: the per-pull success rate curve with soft and hard pity.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{BASE_RATE, HARD_PITY, SOFT_PITY_SLOPE, SOFT_PITY_START};
use crate::numbers::clamp_probability;

/// Errors raised when reward schedule invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("base rate must be strictly between 0 and 1 (got {value})")]
    BaseRateOutOfRange { value: f64 },
    #[error("soft pity must start at pull 1 or later (got {value})")]
    SoftPityStartZero { value: u32 },
    #[error("soft pity start {start} must come before hard pity {hard}")]
    SoftPityAfterHard { start: u32, hard: u32 },
    #[error("soft pity slope must be finite and non-negative (got {value})")]
    InvalidSlope { value: f64 },
    #[error("soft pity share {share:.3} is below the flat-rate mass {flat:.3} of the band")]
    SoftPityShareTooSmall { share: f64, flat: f64 },
}

/// Per-pull success curve for one banner family.
///
/// Pull indices are 1-based and absolute: with `pity` pulls already spent,
/// the k-th new pull is index `pity + k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSchedule {
    pub base_rate: f64,
    pub soft_pity_start: u32,
    pub hard_pity: u32,
    #[serde(default = "RewardSchedule::default_slope")]
    pub soft_pity_slope: f64,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            base_rate: BASE_RATE,
            soft_pity_start: SOFT_PITY_START,
            hard_pity: HARD_PITY,
            soft_pity_slope: SOFT_PITY_SLOPE,
        }
    }
}

impl RewardSchedule {
    const fn default_slope() -> f64 {
        SOFT_PITY_SLOPE
    }

    /// Build and validate a schedule from explicit constants.
    ///
    /// # Errors
    ///
    /// Returns an error if the constants violate the schedule invariants.
    pub fn new(
        base_rate: f64,
        soft_pity_start: u32,
        hard_pity: u32,
        soft_pity_slope: f64,
    ) -> Result<Self, ScheduleError> {
        let schedule = Self {
            base_rate,
            soft_pity_start,
            hard_pity,
            soft_pity_slope,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Build a schedule whose soft-pity band carries `share` of cumulative rate.
    ///
    /// The band covers pulls `soft_pity_start..hard_pity`; its rates are
    /// `base_rate + j * slope` for `j = 0..band`, and the slope is solved so
    /// they sum to `share`. A band of a single pull has no slope to solve.
    ///
    /// # Errors
    ///
    /// Returns an error if the share cannot cover the flat rate of the band,
    /// or if the resulting schedule is invalid.
    pub fn from_soft_pity_share(
        base_rate: f64,
        soft_pity_start: u32,
        hard_pity: u32,
        share: f64,
    ) -> Result<Self, ScheduleError> {
        let band = hard_pity.saturating_sub(soft_pity_start);
        let flat = f64::from(band) * base_rate;
        if share < flat {
            return Err(ScheduleError::SoftPityShareTooSmall { share, flat });
        }
        let steps = f64::from(band) * f64::from(band.saturating_sub(1)) / 2.0;
        let slope = if steps > 0.0 {
            (share - flat) / steps
        } else {
            0.0
        };
        Self::new(base_rate, soft_pity_start, hard_pity, slope)
    }

    /// Check the schedule invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !(self.base_rate > 0.0 && self.base_rate < 1.0) {
            return Err(ScheduleError::BaseRateOutOfRange {
                value: self.base_rate,
            });
        }
        if self.soft_pity_start == 0 {
            return Err(ScheduleError::SoftPityStartZero {
                value: self.soft_pity_start,
            });
        }
        if self.soft_pity_start >= self.hard_pity {
            return Err(ScheduleError::SoftPityAfterHard {
                start: self.soft_pity_start,
                hard: self.hard_pity,
            });
        }
        if !self.soft_pity_slope.is_finite() || self.soft_pity_slope < 0.0 {
            return Err(ScheduleError::InvalidSlope {
                value: self.soft_pity_slope,
            });
        }
        Ok(())
    }

    /// Success probability of pull `n`, given no success earlier in the run.
    ///
    /// Soft-pity values are capped at 1.0 so a steep custom slope never
    /// yields a negative failure factor.
    #[must_use]
    pub fn rate(&self, n: u32) -> f64 {
        if n >= self.hard_pity {
            return 1.0;
        }
        if n < self.soft_pity_start {
            return self.base_rate;
        }
        let into_band = f64::from(n - self.soft_pity_start);
        clamp_probability(self.base_rate + into_band * self.soft_pity_slope)
    }

    /// Highest valid pity counter: one pull short of hard pity.
    #[must_use]
    pub const fn max_pity(&self) -> u32 {
        self.hard_pity.saturating_sub(1)
    }

    /// Upper bound for pull searches: a lost split plus a full guaranteed cycle.
    #[must_use]
    pub const fn search_bound(&self) -> u32 {
        self.hard_pity
            .saturating_mul(crate::constants::SEARCH_CYCLES)
    }
}
