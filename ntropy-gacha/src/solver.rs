//! Inverse odds: fewest pulls that reach a target probability.

use crate::pull::PullState;
use crate::schedule::RewardSchedule;
use crate::split::desired_outcome;

/// Smallest pull budget whose featured-outcome probability meets `target`.
///
/// Binary search over `[0, 2 * hard_pity]`; relies on the probability being
/// non-decreasing in the budget. An unreachable target saturates at the
/// bound, which callers must read as "not reachable".
#[must_use]
pub fn pulls_for_probability(schedule: &RewardSchedule, target: f64, state: PullState) -> u32 {
    let state = state.clamped(schedule);
    let mut low = 0;
    let mut high = schedule.search_bound();

    while low < high {
        let mid = low + (high - low) / 2;
        if desired_outcome(schedule, mid, state).probability < target {
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    low
}

/// Like [`pulls_for_probability`], but `None` when the bound itself misses.
#[must_use]
pub fn pulls_for_probability_checked(
    schedule: &RewardSchedule,
    target: f64,
    state: PullState,
) -> Option<u32> {
    let pulls = pulls_for_probability(schedule, target, state);
    if desired_outcome(schedule, pulls, state).probability >= target {
        Some(pulls)
    } else {
        log::debug!(
            "target {target} unreachable within {pulls} pulls (pity {}, guaranteed {})",
            state.pity,
            state.guaranteed
        );
        None
    }
}
