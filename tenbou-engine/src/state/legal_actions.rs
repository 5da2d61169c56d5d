use crate::action::Action;
use crate::types::MeldKind;

use super::hand::CallOptions;
use super::wall::HAND_SIZE;
use super::{GameState, PendingTile, WinKind, RIICHI_DEPOSIT};

/// Per-seat option menus. [`GameState::legal_actions`] is the only caller
/// that hands these out.
pub(crate) trait GameStateLegalActions {
    /// Options of the seat whose turn it is.
    fn turn_actions(&self, seat: u8) -> Vec<Action>;
    /// Options of a seat on another seat's discard or added kan.
    fn reaction_actions(&self, seat: u8, pending: &PendingTile) -> Vec<Action>;
    fn is_furiten(&self, seat: u8) -> bool;
    /// Room for another kan: fewer than four on the table, and both a
    /// replacement tile and a live tile left.
    fn can_kan(&self) -> bool;
}

impl GameStateLegalActions for GameState {
    fn turn_actions(&self, seat: u8) -> Vec<Action> {
        let s = seat as usize;
        let hand = &self.hands[s];
        if self.riichi_declaring == Some(seat) {
            return hand
                .riichi_discards()
                .into_iter()
                .map(|t| Action::discard(seat, t))
                .collect();
        }

        let mut actions = Vec::with_capacity(HAND_SIZE + 4);
        if hand.can_declare_tsumo(&self.win_context(seat, WinKind::Tsumo)) {
            actions.push(Action::tsumo(seat));
        }
        actions.extend(hand.legal_discards().into_iter().map(|t| Action::discard(seat, t)));
        if hand.can_declare_riichi() && self.score.scores[s] >= RIICHI_DEPOSIT && self.wall.live_remaining() >= 4 {
            actions.push(Action::riichi(seat));
        }
        if hand.drawn_tile().is_some() && self.can_kan() {
            actions.extend(hand.closed_kans().into_iter().map(|m| Action::ankan(seat, m)));
            actions.extend(hand.added_kans().into_iter().map(|m| Action::kakan(seat, m)));
        }
        if self.config.rule.nine_terminals_abort
            && self.uninterrupted
            && self.rivers[s].is_empty()
            && hand.has_nine_terminals()
        {
            actions.push(Action::nine_terminals(seat));
        }
        actions
    }

    fn reaction_actions(&self, seat: u8, pending: &PendingTile) -> Vec<Action> {
        let hand = &self.hands[seat as usize];
        let kind = if pending.chankan { WinKind::Chankan } else { WinKind::Ron };
        let ron = !self.is_furiten(seat) && hand.can_declare_ron(pending.tile, &self.win_context(seat, kind));

        // No calls on a kan tile, on the last discard of the round, or on
        // the discard that ends a round of four kans.
        let mut calls = Vec::new();
        if !pending.chankan && self.wall.live_remaining() > 0 && !self.four_kan_abort_due() {
            let opts = CallOptions {
                allow_kan: self.can_kan(),
                kuikae_forbidden: self.config.rule.kuikae_forbidden,
            };
            for meld in hand.legal_calls(pending.tile, pending.discarder, seat, opts) {
                calls.push(match meld.kind {
                    MeldKind::Chi => Action::chi(seat, meld),
                    MeldKind::Pon => Action::pon(seat, meld),
                    _ => Action::daiminkan(seat, meld),
                });
            }
        }
        if !ron && calls.is_empty() {
            return Vec::new();
        }

        let mut actions = Vec::with_capacity(calls.len() + 2);
        if ron {
            actions.push(Action::ron(seat));
        }
        actions.push(Action::pass(seat));
        actions.extend(calls);
        actions
    }

    fn is_furiten(&self, seat: u8) -> bool {
        let s = seat as usize;
        if self.temp_furiten[s] || self.riichi_furiten[s] {
            return true;
        }
        let river = &self.rivers[s];
        self.hands[s].waits().into_iter().any(|k| river.contains_kind(k))
    }

    fn can_kan(&self) -> bool {
        self.total_kans() < 4 && self.wall.replacements_left() > 0 && self.wall.live_remaining() > 0
    }
}
