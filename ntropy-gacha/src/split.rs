//! Featured-outcome odds: cumulative success combined with the 50/50 split.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::SPLIT_WIN_CHANCE;
use crate::cumulative::success_within;
use crate::numbers::{clamp_probability, percent_label};
use crate::pull::PullState;
use crate::schedule::RewardSchedule;

/// Whether the next top-tier success still has to pass the 50/50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitState {
    Guaranteed,
    FiftyFifty,
}

impl SplitState {
    #[must_use]
    pub const fn from_flag(guaranteed: bool) -> Self {
        if guaranteed {
            Self::Guaranteed
        } else {
            Self::FiftyFifty
        }
    }
}

impl fmt::Display for SplitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guaranteed => write!(f, "GUARANTEED (next top-tier is the featured pick)"),
            Self::FiftyFifty => write!(f, "50/50"),
        }
    }
}

/// One path through the banner that ends on the featured outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Any top-tier success, already committed to the featured pick.
    Guaranteed,
    /// First top-tier success wins the 50/50.
    WinSplit,
    /// First success loses the 50/50, a second (guaranteed) one follows.
    LoseThenGuaranteed,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guaranteed => write!(f, "Guaranteed"),
            Self::WinSplit => write!(f, "Win 50/50"),
            Self::LoseThenGuaranteed => write!(f, "Lose 50/50 -> Guaranteed"),
        }
    }
}

/// Why a branch is missing from an explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationNote {
    NoPullsAvailable,
    /// Budget ends before a lost 50/50 could be followed by a guaranteed cycle.
    FallbackOutOfReach,
}

impl fmt::Display for ExplanationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPullsAvailable => write!(f, "No pulls available"),
            Self::FallbackOutOfReach => {
                write!(f, "Not enough pulls for the guarantee if the 50/50 is lost")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub branch: Branch,
    pub probability: f64,
}

/// Structured breakdown of how a featured-outcome probability was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub state: SplitState,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    #[serde(default)]
    pub notes: Vec<ExplanationNote>,
}

impl Explanation {
    fn new(state: SplitState) -> Self {
        Self {
            state,
            contributions: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn contribution(&self, branch: Branch) -> Option<f64> {
        self.contributions
            .iter()
            .find(|c| c.branch == branch)
            .map(|c| c.probability)
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State: {}", self.state)?;
        let parts: Vec<String> = self
            .contributions
            .iter()
            .map(|c| format!("{}: {}", c.branch, percent_label(c.probability)))
            .chain(self.notes.iter().map(ToString::to_string))
            .collect();
        if !parts.is_empty() {
            write!(f, "\n{}", parts.join(" + "))?;
        }
        Ok(())
    }
}

/// Probability of the featured outcome plus its branch breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityResult {
    pub probability: f64,
    pub explanation: Explanation,
}

impl ProbabilityResult {
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.probability * 100.0
    }
}

/// Probability of pulling the featured outcome within `pulls` pulls.
///
/// On a 50/50 the first success splits evenly. The losing side only pays
/// off when the budget outlasts hard pity for the first success, leaving
/// `pulls - (hard_pity - pity)` pulls for a fresh guaranteed cycle.
#[must_use]
pub fn desired_outcome(
    schedule: &RewardSchedule,
    pulls: u32,
    state: PullState,
) -> ProbabilityResult {
    let state = state.clamped(schedule);
    let mut explanation = Explanation::new(SplitState::from_flag(state.guaranteed));

    if pulls == 0 {
        explanation.notes.push(ExplanationNote::NoPullsAvailable);
        return ProbabilityResult {
            probability: 0.0,
            explanation,
        };
    }

    let first_success = success_within(schedule, pulls, state.pity);

    if state.guaranteed {
        explanation.contributions.push(Contribution {
            branch: Branch::Guaranteed,
            probability: first_success,
        });
        return ProbabilityResult {
            probability: first_success,
            explanation,
        };
    }

    let win = first_success * SPLIT_WIN_CHANCE;
    explanation.contributions.push(Contribution {
        branch: Branch::WinSplit,
        probability: win,
    });

    let worst_first = state.pulls_to_hard_pity(schedule);
    let mut total = win;
    if pulls > worst_first {
        let remaining = pulls - worst_first;
        let lose_then_win =
            first_success * (1.0 - SPLIT_WIN_CHANCE) * success_within(schedule, remaining, 0);
        explanation.contributions.push(Contribution {
            branch: Branch::LoseThenGuaranteed,
            probability: lose_then_win,
        });
        total += lose_then_win;
    } else {
        explanation.notes.push(ExplanationNote::FallbackOutOfReach);
    }

    ProbabilityResult {
        probability: clamp_probability(total),
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> RewardSchedule {
        RewardSchedule::default()
    }

    #[test]
    fn zero_pulls_report_no_budget() {
        let result = desired_outcome(&reference(), 0, PullState::new(10, true));
        assert!(result.probability.abs() < f64::EPSILON);
        assert_eq!(
            result.explanation.notes,
            vec![ExplanationNote::NoPullsAvailable]
        );
        assert!(result.explanation.contributions.is_empty());
    }

    #[test]
    fn guaranteed_matches_cumulative() {
        let schedule = reference();
        let result = desired_outcome(&schedule, 40, PullState::new(30, true));
        let expected = success_within(&schedule, 40, 30);
        assert!((result.probability - expected).abs() < f64::EPSILON);
        assert_eq!(result.explanation.state, SplitState::Guaranteed);
        assert_eq!(result.explanation.contribution(Branch::Guaranteed), Some(expected));
    }

    #[test]
    fn short_budget_only_counts_the_win() {
        let schedule = reference();
        let result = desired_outcome(&schedule, 50, PullState::fresh());
        let expected = success_within(&schedule, 50, 0) * 0.5;
        assert!((result.probability - expected).abs() < f64::EPSILON);
        assert_eq!(
            result.explanation.notes,
            vec![ExplanationNote::FallbackOutOfReach]
        );
        assert_eq!(result.explanation.contribution(Branch::LoseThenGuaranteed), None);
    }

    #[test]
    fn exactly_hard_pity_budget_is_a_coin_flip() {
        let result = desired_outcome(&reference(), 90, PullState::fresh());
        assert!((result.probability - 0.5).abs() < 1e-12);
        assert_eq!(
            result.explanation.notes,
            vec![ExplanationNote::FallbackOutOfReach]
        );
    }

    #[test]
    fn long_budget_adds_the_fallback_branch() {
        let schedule = reference();
        let result = desired_outcome(&schedule, 150, PullState::new(20, false));
        let first = success_within(&schedule, 150, 20);
        let second = success_within(&schedule, 150 - 70, 0);
        let expected = first * 0.5 + first * 0.5 * second;
        assert!((result.probability - expected).abs() < 1e-12);
        assert_eq!(result.explanation.contributions.len(), 2);
        assert!(result.explanation.notes.is_empty());
    }

    #[test]
    fn two_full_cycles_are_certain() {
        let result = desired_outcome(&reference(), 180, PullState::fresh());
        assert!(result.probability > 0.99);
        assert!(result.probability <= 1.0);
    }

    #[test]
    fn explanation_renders_branch_percentages() {
        let result = desired_outcome(&reference(), 180, PullState::fresh());
        let text = result.explanation.to_string();
        assert!(text.starts_with("State: 50/50\n"));
        assert!(text.contains("Win 50/50: 50.0%"));
        assert!(text.contains(" + Lose 50/50 -> Guaranteed: 50.0%"));

        let short = desired_outcome(&reference(), 10, PullState::fresh());
        assert!(short.explanation.to_string().contains("Not enough pulls"));

        let guaranteed = desired_outcome(&reference(), 1, PullState::new(89, true));
        assert!(guaranteed.explanation.to_string().starts_with("State: GUARANTEED"));
    }

    #[test]
    fn out_of_range_pity_is_clamped() {
        let schedule = reference();
        let clamped = desired_outcome(&schedule, 1, PullState::new(400, true));
        let edge = desired_outcome(&schedule, 1, PullState::new(89, true));
        assert_eq!(clamped, edge);
        assert!((clamped.probability - 1.0).abs() < f64::EPSILON);
    }
}
