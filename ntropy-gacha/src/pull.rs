//! Banner state carried into every odds query.
use serde::{Deserialize, Serialize};

use crate::schedule::RewardSchedule;

/// Pity counter plus the 50/50 guarantee flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PullState {
    /// Pulls spent since the last top-tier success.
    #[serde(default)]
    pub pity: u32,
    /// The next top-tier success is the featured one.
    #[serde(default)]
    pub guaranteed: bool,
}

impl PullState {
    #[must_use]
    pub const fn new(pity: u32, guaranteed: bool) -> Self {
        Self { pity, guaranteed }
    }

    #[must_use]
    pub const fn fresh() -> Self {
        Self::new(0, false)
    }

    /// Pin pity into `[0, hard_pity - 1]`.
    ///
    /// A counter at or past hard pity cannot exist on a live banner; it is
    /// treated as "one pull from hard pity" rather than rejected.
    #[must_use]
    pub fn clamped(self, schedule: &RewardSchedule) -> Self {
        let max = schedule.max_pity();
        if self.pity > max {
            log::warn!(
                "pity {} exceeds schedule maximum {max}; clamping",
                self.pity
            );
            return Self {
                pity: max,
                ..self
            };
        }
        self
    }

    /// Pulls until hard pity forces the next top-tier success.
    #[must_use]
    pub const fn pulls_to_hard_pity(&self, schedule: &RewardSchedule) -> u32 {
        schedule.hard_pity.saturating_sub(self.pity)
    }
}
