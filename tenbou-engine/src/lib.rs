#[macro_use]
pub mod round_log;
pub mod action;
pub mod agari;
pub mod errors;
pub mod observation;
pub mod parser;
pub mod rule;
pub mod score;
pub mod state;
#[cfg(test)]
mod tests;
pub mod tile;
pub mod types;
pub mod winning_score;
pub mod yaku;

pub use action::{Action, ActionKind};
pub use errors::{EngineError, EngineResult};
pub use observation::Observation;
pub use rule::GameRule;
pub use state::game_mode::{GameConfig, GameMode};
pub use state::result::{AbortReason, RoundOutcome, RoundResult};
pub use state::{GameState, Phase, TurnPhase};
pub use tile::Tile;
