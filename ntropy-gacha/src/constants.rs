//! Centralized rate and tuning constants for the Ntropy probability engine.
//!
//! These values define the reference reward curve; per-game curves come
//! from the profile catalog.

// Reference reward schedule --------------------------------------------------
pub const BASE_RATE: f64 = 0.006;
pub const SOFT_PITY_START: u32 = 76;
pub const HARD_PITY: u32 = 90;
pub const SOFT_PITY_SLOPE: f64 = 0.06;
/// Cumulative share the soft-pity band is meant to carry (pulls 76-89).
pub const SOFT_PITY_TOTAL_SHARE: f64 = 0.324;

// Split mechanic -------------------------------------------------------------
pub const SPLIT_WIN_CHANCE: f64 = 0.5;

// Solver and summaries -------------------------------------------------------
/// Search bound multiplier: one lost split plus a full guaranteed cycle.
pub const SEARCH_CYCLES: u32 = 2;
pub const MILESTONE_TARGETS: [f64; 4] = [0.5, 0.75, 0.9, 0.99];

// Objectives -----------------------------------------------------------------
pub const DEFAULT_PULLS_NEEDED: u32 = 180;
pub const OBJECTIVE_COMPLETE_PROBABILITY: f64 = 0.99;

// Captures -------------------------------------------------------------------
/// Premium currency units per converted pull.
pub const DEFAULT_CONVERSION_RATIO: u32 = 160;
