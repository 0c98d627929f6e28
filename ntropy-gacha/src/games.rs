//! Supported game profiles and their reward schedules.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::schedule::{RewardSchedule, ScheduleError};

const DEFAULT_GAMES_DATA: &str = include_str!("../data/games.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown game id {0}")]
    UnknownGame(u32),
    #[error("game {game_id} has an invalid schedule: {source}")]
    InvalidSchedule {
        game_id: u32,
        #[source]
        source: ScheduleError,
    },
    #[error("game catalog could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One tracked game: how to spot it and which reward curve its banners use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameProfile {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub process_name: String,
    #[serde(default = "default_capture_key")]
    pub capture_key: String,
    #[serde(default = "default_capture_delay")]
    pub capture_delay_secs: u32,
    #[serde(default)]
    pub schedule: RewardSchedule,
}

fn default_capture_key() -> String {
    "f3".to_string()
}

const fn default_capture_delay() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameCatalog {
    #[serde(default)]
    pub games: Vec<GameProfile>,
}

impl GameCatalog {
    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a schedule is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_GAMES_DATA).unwrap_or_default()
    }

    /// Check every profile's schedule.
    ///
    /// # Errors
    ///
    /// Returns the first game whose schedule breaks an invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for game in &self.games {
            game.schedule
                .validate()
                .map_err(|source| CatalogError::InvalidSchedule {
                    game_id: game.id,
                    source,
                })?;
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, game_id: u32) -> Option<&GameProfile> {
        self.games.iter().find(|g| g.id == game_id)
    }

    /// Reward schedule for a game.
    ///
    /// # Errors
    ///
    /// Returns an error if the game is not in the catalog.
    pub fn schedule_for(&self, game_id: u32) -> Result<RewardSchedule, CatalogError> {
        self.get(game_id)
            .map(|g| g.schedule)
            .ok_or(CatalogError::UnknownGame(game_id))
    }

    /// Match a running process name against the catalog, ignoring case.
    #[must_use]
    pub fn find_by_process(&self, process_name: &str) -> Option<&GameProfile> {
        self.games.iter().find(|g| {
            !g.process_name.is_empty() && g.process_name.eq_ignore_ascii_case(process_name)
        })
    }
}

/// Built-in catalog, parsed once.
#[must_use]
pub fn catalog() -> &'static GameCatalog {
    static CATALOG: OnceLock<GameCatalog> = OnceLock::new();
    CATALOG.get_or_init(GameCatalog::load_from_static)
}
