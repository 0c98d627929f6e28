//! Chance of at least one top-tier success over a run of pulls.

use crate::numbers::clamp_probability;
use crate::schedule::RewardSchedule;

/// Probability of at least one success within `pulls` pulls starting at `pity`.
///
/// Compounds `1 - rate(pity + i)` over the run and stops as soon as a pull
/// reaches hard pity, where the failure product collapses to zero.
#[must_use]
pub fn success_within(schedule: &RewardSchedule, pulls: u32, pity: u32) -> f64 {
    if pulls == 0 {
        return 0.0;
    }

    let mut prob_none = 1.0;
    for i in 1..=pulls {
        let n = pity.saturating_add(i);
        if n >= schedule.hard_pity {
            prob_none = 0.0;
            break;
        }
        prob_none *= 1.0 - schedule.rate(n);
    }

    clamp_probability(1.0 - prob_none)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_pulls_never_succeed() {
        let schedule = RewardSchedule::default();
        assert!(success_within(&schedule, 0, 0).abs() < f64::EPSILON);
        assert!(success_within(&schedule, 0, 89).abs() < f64::EPSILON);
    }

    #[test]
    fn single_flat_pull_is_base_rate() {
        let schedule = RewardSchedule::default();
        assert!((success_within(&schedule, 1, 0) - 0.006).abs() < 1e-12);
    }

    #[test]
    fn flat_region_compounds_geometrically() {
        let schedule = RewardSchedule::default();
        let expected = 1.0 - (1.0 - 0.006_f64).powi(10);
        assert!((success_within(&schedule, 10, 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn reaching_hard_pity_is_certain() {
        let schedule = RewardSchedule::default();
        assert!((success_within(&schedule, 90, 0) - 1.0).abs() < f64::EPSILON);
        assert!((success_within(&schedule, 1, 89) - 1.0).abs() < f64::EPSILON);
        assert!((success_within(&schedule, 1, 120) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_short_of_hard_pity_is_not_certain() {
        let schedule = RewardSchedule::default();
        let p = success_within(&schedule, 89, 0);
        assert!(p < 1.0);
        assert!(p > 0.9);
    }
}
