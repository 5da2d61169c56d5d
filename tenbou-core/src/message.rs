//! Records exchanged with agents.
//!
//! Both messages are plain serde structs so any transport can carry them
//! as JSON. The runner builds an [`ObservationMessage`] per deciding seat
//! and expects an [`ActionMessage`] with matching identifiers back.

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use tenbou_engine::{Action, GameState, Observation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationMessage {
    pub game_id: u64,
    pub round: u32,
    pub seat: u8,
    pub observation: Observation,
    /// Why the previous answer of this seat was rejected, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ObservationMessage {
    pub fn new(state: &GameState, seat: u8) -> Self {
        let ctx = state.round_context();
        Self {
            game_id: ctx.game_id,
            round: ctx.round,
            seat,
            observation: state.observe(seat),
            last_error: None,
        }
    }

    pub fn legal_actions(&self) -> &[Action] {
        self.observation.legal_actions()
    }

    /// An answer addressed back to this observation.
    pub fn reply(&self, action: Action) -> ActionMessage {
        ActionMessage {
            game_id: self.game_id,
            round: self.round,
            seat: self.seat,
            action,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("encoding observation message")
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("decoding observation message")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
    pub game_id: u64,
    pub round: u32,
    pub seat: u8,
    pub action: Action,
}

impl ActionMessage {
    /// The carried action, after checking the message answers `obs`.
    pub fn into_action(self, obs: &ObservationMessage) -> anyhow::Result<Action> {
        ensure!(
            self.game_id == obs.game_id && self.round == obs.round,
            "answer for game {} round {} does not match game {} round {}",
            self.game_id,
            self.round,
            obs.game_id,
            obs.round
        );
        ensure!(
            self.seat == obs.seat && self.action.seat() == obs.seat,
            "answer from seat {} (action of seat {}) sent to seat {}",
            self.seat,
            self.action.seat(),
            obs.seat
        );
        Ok(self.action)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("encoding action message")
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("decoding action message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenbou_engine::{GameConfig, GameMode};

    fn dealer_message() -> ObservationMessage {
        let mut state = GameState::new(GameConfig::new(5, GameMode::East)).unwrap();
        state.start().unwrap();
        ObservationMessage::new(&state, 0)
    }

    #[test]
    fn json_carries_legal_actions() {
        let obs = dealer_message();
        let json = obs.to_json().unwrap();
        assert!(json.contains("\"legal_actions\""));
        assert!(json.contains("\"type\":\"discard\""));
        assert!(!json.contains("last_error"));
        assert_eq!(ObservationMessage::from_json(&json).unwrap(), obs);
    }

    #[test]
    fn reply_round_trips() {
        let obs = dealer_message();
        let reply = obs.reply(obs.legal_actions()[0].clone());
        let back = ActionMessage::from_json(&reply.to_json().unwrap()).unwrap();
        assert_eq!(back.into_action(&obs).unwrap(), obs.legal_actions()[0]);
    }

    #[test]
    fn misaddressed_reply_is_rejected() {
        let obs = dealer_message();
        let mut reply = obs.reply(obs.legal_actions()[0].clone());
        reply.round += 1;
        assert!(reply.into_action(&obs).is_err());

        let reply = ActionMessage {
            seat: 0,
            action: Action::pass(2),
            ..obs.reply(Action::pass(0))
        };
        assert!(reply.into_action(&obs).is_err());
        assert!(ActionMessage::from_json("{").is_err());
    }
}
