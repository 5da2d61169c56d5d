//! Batch game simulation with rayon parallelism.
//!
//! Every game owns its `GameState`, so games run on rayon workers without
//! sharing anything. Game `i` of a batch is seeded from the session, which
//! keeps results independent of the thread count.

use anyhow::Context;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tenbou_engine::{GameConfig, GameMode, GameRule};

use crate::game_loop::{FirstActionSelector, GameRunner, RandomActionSelector, SelectorAgent};
use crate::seeding::SessionRng;

/// How the simulated seats choose among their legal actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Always the first legal action.
    First,
    /// Uniform over the legal set, seeded per game.
    #[default]
    Random,
}

/// Configuration for a batch simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub num_games: usize,
    /// Session seed every game seed derives from.
    pub session_seed: u64,
    /// Threads in the rayon pool. `None` uses rayon's default.
    #[serde(default)]
    pub num_threads: Option<usize>,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub rule: GameRule,
    #[serde(default)]
    pub policy: Policy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_games: 100,
            session_seed: 0,
            num_threads: None,
            mode: GameMode::East,
            rule: GameRule::default(),
            policy: Policy::Random,
        }
    }
}

/// Result from a single completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub seed: u64,
    pub scores: [i32; 4],
    /// Deposits left on the table at the end.
    pub riichi_sticks: u32,
    pub rounds_played: u32,
    pub total_actions: u32,
    /// Rounds that ended in a draw of any kind.
    pub draws: u32,
}

/// Plays one game to the end.
pub fn simulate_single_game(seed: u64, config: &BatchConfig) -> anyhow::Result<GameResult> {
    let game = GameConfig {
        record_log: false,
        ..GameConfig::new(seed, config.mode).with_rule(config.rule)
    };
    let mut runner = GameRunner::new(game)?;
    let played = match config.policy {
        Policy::First => runner.run_to_completion(&mut SelectorAgent::new(FirstActionSelector)),
        Policy::Random => runner.run_to_completion(&mut SelectorAgent::new(RandomActionSelector::new(seed))),
    };
    played.with_context(|| format!("simulating game {}", seed))?;

    Ok(GameResult {
        seed,
        scores: runner.scores(),
        riichi_sticks: runner.state().score().riichi_sticks,
        rounds_played: runner.rounds_played(),
        total_actions: runner.total_actions(),
        draws: runner.results().iter().filter(|r| r.outcome.is_draw()).count() as u32,
    })
}

/// Parallel batch simulator using a dedicated rayon ThreadPool.
pub struct BatchSimulator {
    pool: rayon::ThreadPool,
}

impl BatchSimulator {
    pub fn new(num_threads: Option<usize>) -> anyhow::Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))?;
        Ok(Self { pool })
    }

    /// Runs a batch of games in parallel. Results keep game order; the
    /// first failing game fails the batch.
    pub fn run_batch(&self, config: &BatchConfig) -> anyhow::Result<Vec<GameResult>> {
        self.pool.install(|| run_batch_simple(config))
    }
}

/// Runs a batch on rayon's global pool.
pub fn run_batch_simple(config: &BatchConfig) -> anyhow::Result<Vec<GameResult>> {
    let session = SessionRng::from_u64(config.session_seed);
    (0..config.num_games as u64)
        .into_par_iter()
        .map(|i| simulate_single_game(session.game_seed_at(i), config))
        .collect()
}
