use serde::{Deserialize, Serialize};

use crate::score::PointPayment;
use crate::tile::Tile;
use crate::types::NUM_SEATS;
use crate::winning_score::WinningScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    NineTerminals,
    FourKans,
    FourWinds,
    FourRiichi,
}

/// How a round ended. Exactly one per round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    Tsumo { winner: u8 },
    /// `winners` in settlement order, closest to the discarder first.
    Ron { winners: Vec<u8>, discarder: u8 },
    ExhaustiveDraw { tenpai: [bool; NUM_SEATS] },
    AbortiveDraw { reason: AbortReason },
}

impl RoundOutcome {
    pub fn is_draw(&self) -> bool {
        matches!(self, RoundOutcome::ExhaustiveDraw { .. } | RoundOutcome::AbortiveDraw { .. })
    }

    pub fn winners(&self) -> Vec<u8> {
        match self {
            RoundOutcome::Tsumo { winner } => vec![*winner],
            RoundOutcome::Ron { winners, .. } => winners.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRecord {
    pub seat: u8,
    /// `None` for tsumo.
    pub from_seat: Option<u8>,
    pub win_tile: Tile,
    pub score: WinningScore,
    pub payment: PointPayment,
}

/// Settlement of one round.
///
/// `deltas` always sum to zero. Riichi deposits are paid separately through
/// `deposit_payout`, which is non-zero only for the seat that collected them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub outcome: RoundOutcome,
    pub deltas: [i32; NUM_SEATS],
    pub deposit_payout: [i32; NUM_SEATS],
    pub wins: Vec<WinRecord>,
    pub dealer_repeats: bool,
}

/// Tenpai payments from the 3000 pool. Nobody or everybody tenpai moves nothing.
pub fn tenpai_deltas(tenpai: &[bool; NUM_SEATS], pool: i32) -> [i32; NUM_SEATS] {
    let count = tenpai.iter().filter(|&&t| t).count() as i32;
    let mut deltas = [0; NUM_SEATS];
    if count == 0 || count == NUM_SEATS as i32 {
        return deltas;
    }
    let gain = pool / count;
    let loss = pool / (NUM_SEATS as i32 - count);
    for (delta, &is_tenpai) in deltas.iter_mut().zip(tenpai) {
        *delta = if is_tenpai { gain } else { -loss };
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenpai_pool_splits() {
        assert_eq!(tenpai_deltas(&[true, false, false, false], 3000), [3000, -1000, -1000, -1000]);
        assert_eq!(tenpai_deltas(&[true, true, false, false], 3000), [1500, 1500, -1500, -1500]);
        assert_eq!(tenpai_deltas(&[true, true, true, false], 3000), [1000, 1000, 1000, -3000]);
        assert_eq!(tenpai_deltas(&[false; 4], 3000), [0; 4]);
        assert_eq!(tenpai_deltas(&[true; 4], 3000), [0; 4]);
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let outcome = RoundOutcome::AbortiveDraw {
            reason: AbortReason::FourKans,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"kind":"abortive_draw","reason":"four_kans"}"#);
        assert!(outcome.is_draw());
        assert!(outcome.winners().is_empty());
    }
}
