//! Milestone summaries bundling direct odds with inverse answers.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::MILESTONE_TARGETS;
use crate::pull::PullState;
use crate::schedule::RewardSchedule;
use crate::solver::pulls_for_probability;
use crate::split::{Explanation, desired_outcome};

/// Odds for a pull budget plus the pulls needed for each confidence milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneReport {
    pub probability: f64,
    pub explanation: Explanation,
    /// Confidence label (`"50%"`, ...) to minimum pulls.
    pub milestones: BTreeMap<String, u32>,
    /// Pulls that guarantee the featured outcome regardless of luck.
    pub worst_case_pulls: u32,
}

impl MilestoneReport {
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.probability * 100.0
    }

    #[must_use]
    pub fn pulls_for(&self, target: f64) -> Option<u32> {
        self.milestones.get(&milestone_label(target)).copied()
    }
}

/// Label used for a milestone target, e.g. `0.9` -> `"90%"`.
#[must_use]
pub fn milestone_label(target: f64) -> String {
    format!("{:.0}%", target * 100.0)
}

/// Conservative pull count that always lands the featured outcome.
///
/// One hard-pity cycle when guaranteed, two otherwise, minus spent pity.
#[must_use]
pub const fn worst_case_pulls(schedule: &RewardSchedule, state: PullState) -> u32 {
    let cycles = if state.guaranteed { 1 } else { 2 };
    schedule
        .hard_pity
        .saturating_mul(cycles)
        .saturating_sub(state.pity)
}

#[must_use]
pub fn milestone_report(
    schedule: &RewardSchedule,
    pulls: u32,
    state: PullState,
) -> MilestoneReport {
    let state = state.clamped(schedule);
    let result = desired_outcome(schedule, pulls, state);

    let milestones = MILESTONE_TARGETS
        .iter()
        .map(|&target| {
            (
                milestone_label(target),
                pulls_for_probability(schedule, target, state),
            )
        })
        .collect();

    MilestoneReport {
        probability: result.probability,
        explanation: result.explanation,
        milestones,
        worst_case_pulls: worst_case_pulls(schedule, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_confidence_levels() {
        let labels: Vec<String> = MILESTONE_TARGETS
            .iter()
            .map(|&t| milestone_label(t))
            .collect();
        assert_eq!(labels, ["50%", "75%", "90%", "99%"]);
    }

    #[test]
    fn worst_case_counts_cycles_minus_pity() {
        let schedule = RewardSchedule::default();
        assert_eq!(worst_case_pulls(&schedule, PullState::new(10, true)), 80);
        assert_eq!(worst_case_pulls(&schedule, PullState::new(10, false)), 170);
        assert_eq!(worst_case_pulls(&schedule, PullState::fresh()), 180);
    }

    #[test]
    fn report_carries_direct_odds_and_milestones() {
        let schedule = RewardSchedule::default();
        let report = milestone_report(&schedule, 60, PullState::new(20, false));
        let direct = desired_outcome(&schedule, 60, PullState::new(20, false));
        assert!((report.probability - direct.probability).abs() < f64::EPSILON);
        assert_eq!(report.explanation, direct.explanation);
        assert_eq!(report.milestones.len(), 4);
        assert_eq!(report.worst_case_pulls, 160);
        assert!(report.pulls_for(0.9).is_some());
        assert!((report.percentage() - direct.percentage()).abs() < 1e-9);
    }

    #[test]
    fn milestones_never_exceed_worst_case_bound() {
        let schedule = RewardSchedule::default();
        for guaranteed in [true, false] {
            let report = milestone_report(&schedule, 0, PullState::new(5, guaranteed));
            for pulls in report.milestones.values() {
                assert!(*pulls <= report.worst_case_pulls);
            }
        }
    }
}
