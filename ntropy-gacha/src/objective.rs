//! Collection objectives and progress toward them.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GachaEngine;
use crate::constants::{DEFAULT_PULLS_NEEDED, OBJECTIVE_COMPLETE_PROBABILITY};
use crate::numbers::whole_pulls;
use crate::pull::PullState;
use crate::schedule::RewardSchedule;
use crate::split::Explanation;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectiveError {
    #[error("objective name must not be empty")]
    EmptyName,
    #[error("pulls needed must be greater than zero")]
    NoPullsNeeded,
    #[error("pity {pity} must be between 0 and {max}")]
    PityOutOfRange { pity: u32, max: u32 },
}

/// A featured pick the player is saving for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub game_id: u32,
    pub name: String,
    #[serde(default = "default_pulls_needed")]
    pub pulls_needed: u32,
    #[serde(default)]
    pub current_pity: u32,
    #[serde(default)]
    pub guaranteed: bool,
}

const fn default_pulls_needed() -> u32 {
    DEFAULT_PULLS_NEEDED
}

impl Objective {
    /// Check the objective against the game's schedule.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty name, zero pulls needed, or pity past
    /// the schedule's last valid counter.
    pub fn validate(&self, schedule: &RewardSchedule) -> Result<(), ObjectiveError> {
        if self.name.trim().is_empty() {
            return Err(ObjectiveError::EmptyName);
        }
        if self.pulls_needed == 0 {
            return Err(ObjectiveError::NoPullsNeeded);
        }
        if self.current_pity > schedule.max_pity() {
            return Err(ObjectiveError::PityOutOfRange {
                pity: self.current_pity,
                max: schedule.max_pity(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn pull_state(&self) -> PullState {
        PullState::new(self.current_pity, self.guaranteed)
    }
}

/// Where an objective stands for a given stash of pulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveProgress {
    pub objective: Objective,
    pub current_pulls: f64,
    /// Saved pulls over pulls needed, capped at 100.
    pub progress_percent: f64,
    pub remaining: f64,
    /// Featured-outcome probability for the whole pulls on hand.
    pub probability: f64,
    pub explanation: Explanation,
    pub is_complete: bool,
}

impl ObjectiveProgress {
    #[must_use]
    pub fn probability_percent(&self) -> f64 {
        self.probability * 100.0
    }
}

/// Progress of `objective` with `current_pulls` saved.
///
/// Fractional pulls count toward the progress bar but not toward odds.
#[must_use]
pub fn objective_progress(
    engine: &GachaEngine,
    objective: &Objective,
    current_pulls: f64,
) -> ObjectiveProgress {
    let needed = f64::from(objective.pulls_needed);
    let progress_percent = if objective.pulls_needed > 0 {
        (current_pulls / needed * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let remaining = (needed - current_pulls).max(0.0);

    let result = engine.desired_outcome(whole_pulls(current_pulls), objective.pull_state());

    ObjectiveProgress {
        objective: objective.clone(),
        current_pulls,
        progress_percent,
        remaining,
        probability: result.probability,
        explanation: result.explanation,
        is_complete: result.probability >= OBJECTIVE_COMPLETE_PROBABILITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objective(pulls_needed: u32, pity: u32, guaranteed: bool) -> Objective {
        Objective {
            id: "obj-1".to_string(),
            game_id: 1,
            name: "Featured".to_string(),
            pulls_needed,
            current_pity: pity,
            guaranteed,
        }
    }

    #[test]
    fn validate_checks_fields() {
        let schedule = RewardSchedule::default();
        assert_eq!(objective(180, 0, false).validate(&schedule), Ok(()));
        assert_eq!(
            objective(0, 0, false).validate(&schedule),
            Err(ObjectiveError::NoPullsNeeded)
        );
        assert_eq!(
            objective(180, 90, false).validate(&schedule),
            Err(ObjectiveError::PityOutOfRange { pity: 90, max: 89 })
        );
        let mut unnamed = objective(180, 0, false);
        unnamed.name = "  ".to_string();
        assert_eq!(unnamed.validate(&schedule), Err(ObjectiveError::EmptyName));
    }

    #[test]
    fn progress_caps_percent_and_remaining() {
        let engine = GachaEngine::default();
        let progress = objective_progress(&engine, &objective(100, 0, false), 150.5);
        assert!((progress.progress_percent - 100.0).abs() < f64::EPSILON);
        assert!(progress.remaining.abs() < f64::EPSILON);

        let partial = objective_progress(&engine, &objective(180, 0, false), 45.0);
        assert!((partial.progress_percent - 25.0).abs() < 1e-9);
        assert!((partial.remaining - 135.0).abs() < 1e-9);
        assert!(!partial.is_complete);
    }

    #[test]
    fn probability_uses_whole_pulls() {
        let engine = GachaEngine::default();
        let obj = objective(90, 0, true);
        let fractional = objective_progress(&engine, &obj, 89.9);
        let whole = engine.desired_outcome(89, obj.pull_state());
        assert!((fractional.probability - whole.probability).abs() < f64::EPSILON);
        assert!(!fractional.is_complete);

        let done = objective_progress(&engine, &obj, 90.0);
        assert!(done.is_complete);
        assert!((done.probability_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_captures_mean_no_pulls() {
        let engine = GachaEngine::default();
        let progress = objective_progress(&engine, &objective(180, 10, false), -4.0);
        assert!(progress.probability.abs() < f64::EPSILON);
        assert!(progress.progress_percent.abs() < f64::EPSILON);
        assert!((progress.remaining - 184.0).abs() < 1e-9);
    }
}
