//! Ntropy Gacha Engine
//!
//! Platform-agnostic odds for pity-based banners with a 50/50 split.
//! This crate computes featured-outcome probabilities and tracks objectives
//! without any capture, OCR, or UI dependencies.

pub mod capture;
pub mod constants;
pub mod cumulative;
pub mod games;
pub mod numbers;
pub mod objective;
pub mod pull;
pub mod schedule;
pub mod solver;
pub mod split;
pub mod summary;

// Re-export commonly used types
pub use capture::{
    Capture, CaptureError, CaptureStats, check_value, combine_currency, history, next_capture_id,
};
pub use cumulative::success_within;
pub use games::{CatalogError, GameCatalog, GameProfile, catalog};
pub use objective::{Objective, ObjectiveError, ObjectiveProgress, objective_progress};
pub use pull::PullState;
pub use schedule::{RewardSchedule, ScheduleError};
pub use solver::{pulls_for_probability, pulls_for_probability_checked};
pub use split::{
    Branch, Contribution, Explanation, ExplanationNote, ProbabilityResult, SplitState,
    desired_outcome,
};
pub use summary::{MilestoneReport, milestone_label, milestone_report, worst_case_pulls};

/// Odds calculator bound to one immutable reward schedule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GachaEngine {
    schedule: RewardSchedule,
}

impl GachaEngine {
    /// Create an engine for a validated schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule violates its invariants.
    pub fn new(schedule: RewardSchedule) -> Result<Self, ScheduleError> {
        schedule.validate()?;
        Ok(Self { schedule })
    }

    #[must_use]
    pub const fn schedule(&self) -> &RewardSchedule {
        &self.schedule
    }

    #[must_use]
    pub fn success_within(&self, pulls: u32, pity: u32) -> f64 {
        success_within(&self.schedule, pulls, pity)
    }

    #[must_use]
    pub fn desired_outcome(&self, pulls: u32, state: PullState) -> ProbabilityResult {
        desired_outcome(&self.schedule, pulls, state)
    }

    #[must_use]
    pub fn pulls_for_probability(&self, target: f64, state: PullState) -> u32 {
        pulls_for_probability(&self.schedule, target, state)
    }

    #[must_use]
    pub fn milestone_report(&self, pulls: u32, state: PullState) -> MilestoneReport {
        milestone_report(&self.schedule, pulls, state)
    }
}

/// Trait for abstracting objective and capture persistence
/// Platform-specific implementations should provide this
pub trait TrackerStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every objective for a game
    ///
    /// # Errors
    ///
    /// Returns an error if the objectives cannot be read.
    fn load_objectives(&self, game_id: u32) -> Result<Vec<Objective>, Self::Error>;

    /// Insert or replace an objective (matched by game and id)
    ///
    /// # Errors
    ///
    /// Returns an error if the objective cannot be written.
    fn save_objective(&self, objective: &Objective) -> Result<(), Self::Error>;

    /// Remove an objective, reporting whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the objectives cannot be rewritten.
    fn remove_objective(&self, game_id: u32, objective_id: &str) -> Result<bool, Self::Error>;

    /// Append a capture to the history
    ///
    /// # Errors
    ///
    /// Returns an error if the capture cannot be written.
    fn append_capture(&self, capture: &Capture) -> Result<(), Self::Error>;

    /// Load the full capture history in storage order
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn load_captures(&self) -> Result<Vec<Capture>, Self::Error>;

    /// Delete a capture, reporting whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be rewritten.
    fn delete_capture(&self, capture_id: u64) -> Result<bool, Self::Error>;

    /// Drop every capture of a game (or of all games), returning how many went
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be rewritten.
    fn clear_captures(&self, game_id: Option<u32>) -> Result<usize, Self::Error>;
}

/// Binds the game catalog to a storage backend for objective tracking
pub struct Tracker<S>
where
    S: TrackerStorage,
{
    catalog: GameCatalog,
    storage: S,
}

impl<S> Tracker<S>
where
    S: TrackerStorage,
    S::Error: Into<anyhow::Error>,
{
    /// Create a tracker with the provided catalog and storage
    pub const fn new(catalog: GameCatalog, storage: S) -> Self {
        Self { catalog, storage }
    }

    #[must_use]
    pub const fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Engine configured with a game's reward schedule
    ///
    /// # Errors
    ///
    /// Returns an error if the game is unknown or its schedule is invalid.
    pub fn engine_for(&self, game_id: u32) -> Result<GachaEngine, CatalogError> {
        let schedule = self.catalog.schedule_for(game_id)?;
        GachaEngine::new(schedule)
            .map_err(|source| CatalogError::InvalidSchedule { game_id, source })
    }

    /// Validate and store an objective
    ///
    /// # Errors
    ///
    /// Returns an error if the game is unknown, the objective is invalid,
    /// or storage fails.
    pub fn add_objective(&self, objective: &Objective) -> anyhow::Result<()> {
        let engine = self.engine_for(objective.game_id)?;
        objective.validate(engine.schedule())?;
        self.storage.save_objective(objective).map_err(Into::into)
    }

    /// Remove an objective
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn remove_objective(&self, game_id: u32, objective_id: &str) -> anyhow::Result<bool> {
        self.storage
            .remove_objective(game_id, objective_id)
            .map_err(Into::into)
    }

    /// Record a reading for a game and return the stored capture
    ///
    /// # Errors
    ///
    /// Returns an error if the game is unknown, the value is not finite,
    /// or storage fails.
    pub fn record_capture(
        &self,
        game_id: u32,
        value: f64,
        timestamp: &str,
        notes: &str,
    ) -> anyhow::Result<Capture> {
        if self.catalog.get(game_id).is_none() {
            return Err(CatalogError::UnknownGame(game_id).into());
        }
        let value = check_value(value)?;
        let existing = self.storage.load_captures().map_err(Into::into)?;
        let capture = Capture {
            id: next_capture_id(&existing),
            game_id,
            value,
            timestamp: timestamp.to_string(),
            notes: notes.to_string(),
        };
        self.storage.append_capture(&capture).map_err(Into::into)?;
        Ok(capture)
    }

    /// Delete a capture by id, reporting whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn delete_capture(&self, capture_id: u64) -> anyhow::Result<bool> {
        self.storage.delete_capture(capture_id).map_err(Into::into)
    }

    /// Clear capture history for one game or all of them
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn clear_history(&self, game_id: Option<u32>) -> anyhow::Result<usize> {
        self.storage.clear_captures(game_id).map_err(Into::into)
    }

    /// Capture history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be loaded.
    pub fn history(
        &self,
        game_id: Option<u32>,
        limit: Option<usize>,
    ) -> anyhow::Result<Vec<Capture>> {
        let captures = self.storage.load_captures().map_err(Into::into)?;
        Ok(history(&captures, game_id, limit))
    }

    /// Most recent capture for a game, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be loaded.
    pub fn last_capture(&self, game_id: u32) -> anyhow::Result<Option<Capture>> {
        Ok(self.history(Some(game_id), Some(1))?.into_iter().next())
    }

    /// Summary statistics for a game's (or every game's) history
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be loaded.
    pub fn stats(&self, game_id: Option<u32>) -> anyhow::Result<CaptureStats> {
        Ok(CaptureStats::from_captures(&self.history(game_id, None)?))
    }

    /// Progress for every objective of a game
    ///
    /// Uses `simulated_pulls` when given, otherwise the game's last capture
    /// (zero when nothing has been captured yet).
    ///
    /// # Errors
    ///
    /// Returns an error if the game is unknown or storage fails.
    pub fn progress(
        &self,
        game_id: u32,
        simulated_pulls: Option<f64>,
    ) -> anyhow::Result<Vec<ObjectiveProgress>> {
        let engine = self.engine_for(game_id)?;
        let current_pulls = match simulated_pulls {
            Some(pulls) => pulls,
            None => self.last_capture(game_id)?.map_or(0.0, |c| c.value),
        };
        let objectives = self.storage.load_objectives(game_id).map_err(Into::into)?;
        Ok(objectives
            .iter()
            .map(|objective| objective_progress(&engine, objective, current_pulls))
            .collect())
    }
}
