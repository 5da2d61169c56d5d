//! Typed record of everything that happened at the table.
//!
//! Events are plain enums pushed during play. JSON is produced only on
//! export, one event per line.

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};
use crate::state::result::RoundOutcome;
use crate::tile::Tile;
use crate::types::{Meld, NUM_SEATS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    /// Start of a round with the initial deal.
    Deal {
        hands: [Vec<Tile>; NUM_SEATS],
        dora_indicator: Tile,
        scores: [i32; NUM_SEATS],
    },
    Draw {
        seat: u8,
        tile: Tile,
        replacement: bool,
    },
    Discard {
        seat: u8,
        tile: Tile,
        tsumogiri: bool,
        /// The discard that declared riichi.
        riichi: bool,
    },
    /// Riichi deposit taken after the declaring discard survived.
    RiichiDeclared { seat: u8 },
    Call { seat: u8, meld: Meld },
    DoraReveal { indicator: Tile },
    RoundEnd {
        outcome: RoundOutcome,
        deltas: [i32; NUM_SEATS],
    },
}

/// Position of an event in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    pub round: u32,
    pub dealer: u8,
    pub honba: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub meta: EventMeta,
    pub event: RoundEvent,
}

/// All events of one game, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    pub seed: u64,
    pub events: Vec<LoggedEvent>,
}

impl GameLog {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            events: Vec::with_capacity(256),
        }
    }

    pub(crate) fn push(&mut self, meta: EventMeta, event: RoundEvent) {
        self.events.push(LoggedEvent { meta, event });
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_json_lines(&self) -> EngineResult<String> {
        let mut out = String::new();
        for e in &self.events {
            out.push_str(&serde_json::to_string(e)?);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn from_json_lines(seed: u64, text: &str) -> EngineResult<Self> {
        let mut log = Self::new(seed);
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event: LoggedEvent = serde_json::from_str(line).map_err(|e| EngineError::Serialization {
                message: format!("line {}: {}", lineno + 1, e),
            })?;
            log.events.push(event);
        }
        Ok(log)
    }
}

/// Records an event when logging is enabled for the game.
///
/// The event expression is not evaluated when logging is off.
macro_rules! round_event {
    ($state:expr, $event:expr) => {
        if $state.config.record_log {
            let event = $event;
            let meta = $state.event_meta();
            $state.log.push(meta, event);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tiles;
    use crate::state::result::AbortReason;

    #[test]
    fn json_lines_round_trip() {
        let tiles = parse_tiles("1m9p").unwrap();
        let meta = EventMeta {
            round: 0,
            dealer: 0,
            honba: 0,
        };
        let mut log = GameLog::new(42);
        log.push(
            meta,
            RoundEvent::Draw {
                seat: 1,
                tile: tiles[0],
                replacement: false,
            },
        );
        log.push(
            meta,
            RoundEvent::RoundEnd {
                outcome: RoundOutcome::AbortiveDraw {
                    reason: AbortReason::FourWinds,
                },
                deltas: [0; 4],
            },
        );
        let text = log.to_json_lines().unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with(r#"{"meta":{"round":0,"dealer":0,"honba":0},"event":{"type":"draw""#));
        let back = GameLog::from_json_lines(42, &text).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn bad_line_is_a_serialization_error() {
        let err = GameLog::from_json_lines(1, "{}\n").unwrap_err();
        assert!(matches!(err, EngineError::Serialization { .. }));
    }
}
