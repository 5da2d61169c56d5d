use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::errors::{EngineError, EngineResult};
use crate::state::river::RiverEntry;
use crate::state::{GameState, RoundContext};
use crate::tile::Tile;
use crate::types::{Meld, NUM_SEATS};

/// What one seat may see of the table, plus its legal options.
///
/// Never holds other seats' concealed tiles, undrawn wall tiles or ura
/// indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub seat: u8,
    pub round: Arc<RoundContext>,
    pub hand: Vec<Tile>,
    pub drawn_tile: Option<Tile>,
    pub melds: [Vec<Meld>; NUM_SEATS],
    pub rivers: [Vec<RiverEntry>; NUM_SEATS],
    pub dora_indicators: Vec<Tile>,
    pub scores: [i32; NUM_SEATS],
    pub riichi_declared: [bool; NUM_SEATS],
    pub riichi_sticks: u32,
    pub live_tiles_remaining: usize,
    pub current_seat: u8,
    /// Waits of the own hand between turns, empty otherwise.
    pub waits: Vec<u8>,
    legal_actions: Vec<Action>,
}

impl Observation {
    pub fn build(seat: u8, state: &GameState) -> Self {
        let own = state.hand(seat);
        let score = state.score();
        Self {
            seat,
            round: Arc::clone(state.round_context()),
            hand: own.concealed().to_vec(),
            drawn_tile: own.drawn_tile(),
            melds: std::array::from_fn(|s| state.hand(s as u8).melds().to_vec()),
            rivers: std::array::from_fn(|s| state.river(s as u8).entries().to_vec()),
            dora_indicators: state.wall().dora_indicators().to_vec(),
            scores: score.scores,
            riichi_declared: std::array::from_fn(|s| state.hand(s as u8).is_riichi()),
            riichi_sticks: score.riichi_sticks,
            live_tiles_remaining: state.wall().live_remaining(),
            current_seat: state.current_seat(),
            waits: own.waits(),
            legal_actions: state.legal_actions(seat),
        }
    }

    pub fn legal_actions(&self) -> &[Action] {
        &self.legal_actions
    }

    /// First legal action in the slot `encoded` of [`Action::encode`].
    pub fn find_action(&self, encoded: u8) -> Option<&Action> {
        self.legal_actions.iter().find(|a| a.encode() == encoded)
    }

    /// Slots of [`Action::encode`] that some legal action occupies.
    pub fn action_mask(&self) -> [bool; crate::action::ACTION_SPACE] {
        let mut mask = [false; crate::action::ACTION_SPACE];
        for a in &self.legal_actions {
            mask[a.encode() as usize] = true;
        }
        mask
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn serialize_to_base64(&self) -> EngineResult<String> {
        let json = serde_json::to_vec(self).map_err(|e| EngineError::Serialization {
            message: format!("serialization failed: {e}"),
        })?;
        Ok(BASE64.encode(&json))
    }

    pub fn deserialize_from_base64(s: &str) -> EngineResult<Self> {
        let bytes = BASE64.decode(s).map_err(|e| EngineError::Serialization {
            message: format!("base64 decode failed: {e}"),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| EngineError::Serialization {
            message: format!("JSON deserialize failed: {e}"),
        })
    }
}
