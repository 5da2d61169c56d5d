use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};
use crate::rule::GameRule;

pub const STARTING_SCORE: i32 = 25000;
pub const TENPAI_POOL: i32 = 3000;
/// Points a leader needs before the game may end at the final wind.
pub const TARGET_SCORE: i32 = 30000;

/// Game length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// One round, then the game ends.
    Single,
    /// East wind only (tonpuusen).
    #[default]
    East,
    /// East and south winds (hanchan).
    Half,
}

impl GameMode {
    /// Number of winds played in full. Once the round wind reaches it the game
    /// ends as soon as someone holds the target; one wind later it ends anyway.
    pub fn final_wind(self) -> u8 {
        match self {
            GameMode::Single => 0,
            GameMode::East => 1,
            GameMode::Half => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Game id and root of every round's wall seed.
    pub seed: u64,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default = "default_starting_score")]
    pub starting_score: i32,
    #[serde(default)]
    pub rule: GameRule,
    /// Whether the state keeps a round log.
    #[serde(default = "default_record_log")]
    pub record_log: bool,
}

fn default_starting_score() -> i32 {
    STARTING_SCORE
}

fn default_record_log() -> bool {
    true
}

impl GameConfig {
    pub fn new(seed: u64, mode: GameMode) -> Self {
        Self {
            seed,
            mode,
            starting_score: STARTING_SCORE,
            rule: GameRule::default(),
            record_log: true,
        }
    }

    pub fn with_rule(mut self, rule: GameRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn from_json(text: &str) -> EngineResult<Self> {
        let config: GameConfig = serde_json::from_str(text).map_err(|e| EngineError::Configuration {
            message: format!("malformed game config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.starting_score <= 0 {
            return Err(EngineError::Configuration {
                message: format!("starting score must be positive, got {}", self.starting_score),
            });
        }
        if self.starting_score % 100 != 0 {
            return Err(EngineError::Configuration {
                message: format!(
                    "starting score must be a multiple of 100, got {}",
                    self.starting_score
                ),
            });
        }
        Ok(())
    }
}
