use serde::{Deserialize, Serialize};

use crate::state::game_mode::{GameMode, TARGET_SCORE};
use crate::types::NUM_SEATS;

/// Points moved by one win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayment {
    pub total: u32,
    /// What the discarder pays on ron.
    pub ron: u32,
    /// What the dealer pays on a non-dealer tsumo.
    pub tsumo_dealer: u32,
    /// What each non-dealer pays on tsumo.
    pub tsumo_non_dealer: u32,
}

pub fn calculate_payment(han: u8, fu: u8, is_dealer: bool, is_tsumo: bool, honba: u32) -> PointPayment {
    let base_points = if han >= 5 {
        match han {
            5 => 2000,
            6 | 7 => 3000,
            8..=10 => 4000,
            11 | 12 => 6000,
            _ => 8000 * (han as u32 / 13),
        }
    } else {
        let fu = round_up_fu(fu) as u32;
        (fu * 2u32.pow(2 + han as u32)).min(2000)
    };
    payment_from_base(base_points, is_dealer, is_tsumo, honba)
}

/// Limit hands: `multiplier` counts stacked yakuman.
pub fn yakuman_payment(multiplier: u8, is_dealer: bool, is_tsumo: bool, honba: u32) -> PointPayment {
    payment_from_base(8000 * multiplier as u32, is_dealer, is_tsumo, honba)
}

fn payment_from_base(base_points: u32, is_dealer: bool, is_tsumo: bool, honba: u32) -> PointPayment {
    let mut p = if is_tsumo {
        let (from_dealer, from_other) = if is_dealer {
            (0, ceil_100(base_points * 2))
        } else {
            (ceil_100(base_points * 2), ceil_100(base_points))
        };
        let total = if is_dealer {
            from_other * 3
        } else {
            from_dealer + from_other * 2
        };
        PointPayment {
            total,
            ron: 0,
            tsumo_dealer: from_dealer,
            tsumo_non_dealer: from_other,
        }
    } else {
        let total = if is_dealer {
            ceil_100(base_points * 6)
        } else {
            ceil_100(base_points * 4)
        };
        PointPayment {
            total,
            ron: total,
            tsumo_dealer: 0,
            tsumo_non_dealer: 0,
        }
    };

    // 300 per repeat counter: 100 from each payer on tsumo
    if is_tsumo {
        if !is_dealer {
            p.tsumo_dealer += honba * 100;
        }
        p.tsumo_non_dealer += honba * 100;
    } else {
        p.ron += honba * 300;
    }
    p.total += honba * 300;
    p
}

pub(crate) fn round_up_fu(fu: u8) -> u8 {
    if fu == 25 {
        return 25;
    }
    fu.div_ceil(10) * 10
}

fn ceil_100(val: u32) -> u32 {
    val.div_ceil(100) * 100
}

/// The game-long score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub scores: [i32; NUM_SEATS],
    pub dealer: u8,
    /// 0 = east, 1 = south, ...
    pub round_wind: u8,
    /// Rounds played so far in this game.
    pub round: u32,
    pub honba: u8,
    pub riichi_sticks: u32,
}

impl Score {
    pub fn new(starting_score: i32) -> Self {
        Self {
            scores: [starting_score; NUM_SEATS],
            dealer: 0,
            round_wind: 0,
            round: 0,
            honba: 0,
            riichi_sticks: 0,
        }
    }

    /// Points on the table including riichi deposits.
    pub fn table_total(&self) -> i64 {
        self.scores.iter().map(|&s| s as i64).sum::<i64>() + self.riichi_sticks as i64 * 1000
    }

    pub(crate) fn apply_deltas(&mut self, deltas: &[i32; NUM_SEATS]) {
        for (score, delta) in self.scores.iter_mut().zip(deltas) {
            *score += delta;
        }
    }

    pub(crate) fn take_deposit(&mut self, seat: u8) {
        self.scores[seat as usize] -= 1000;
        self.riichi_sticks += 1;
    }

    /// Pays every deposit on the table to `seat` and returns the amount.
    pub(crate) fn pay_out_deposits(&mut self, seat: u8) -> i32 {
        let amount = self.riichi_sticks as i32 * 1000;
        self.scores[seat as usize] += amount;
        self.riichi_sticks = 0;
        amount
    }

    /// Moves to the next round. A draw or a dealer repeat adds a repeat
    /// counter; otherwise the counter resets and the dealer seat rotates.
    pub(crate) fn advance(&mut self, dealer_repeats: bool, is_draw: bool) {
        if dealer_repeats || is_draw {
            self.honba = self.honba.saturating_add(1);
        } else {
            self.honba = 0;
        }
        if !dealer_repeats {
            self.dealer = (self.dealer + 1) % NUM_SEATS as u8;
            if self.dealer == 0 {
                self.round_wind += 1;
            }
        }
        self.round += 1;
    }

    /// Pure over the table: someone below zero, or the final wind of `mode`
    /// is over and a seat reached the target (unconditionally one wind later).
    pub fn is_game_over(&self, mode: GameMode) -> bool {
        if self.scores.iter().any(|&s| s < 0) {
            return true;
        }
        match mode {
            GameMode::Single => self.round >= 1,
            _ => {
                let final_wind = mode.final_wind();
                let max_score = self.scores.iter().copied().max().unwrap_or(0);
                self.round_wind > final_wind
                    || (self.round_wind == final_wind && max_score >= TARGET_SCORE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_dealer_ron_table() {
        assert_eq!(calculate_payment(1, 30, false, false, 0).ron, 1000);
        assert_eq!(calculate_payment(1, 40, false, false, 0).ron, 1300);
        assert_eq!(calculate_payment(3, 30, false, false, 0).ron, 3900);
        assert_eq!(calculate_payment(4, 30, false, false, 0).ron, 7700);
        assert_eq!(calculate_payment(5, 30, false, false, 0).ron, 8000);
        assert_eq!(calculate_payment(2, 25, false, false, 0).ron, 1600);
    }

    #[test]
    fn dealer_payments() {
        assert_eq!(calculate_payment(1, 30, true, false, 0).ron, 1500);
        let tsumo = calculate_payment(1, 30, true, true, 0);
        assert_eq!(tsumo.tsumo_non_dealer, 500);
        assert_eq!(tsumo.total, 1500);
    }

    #[test]
    fn non_dealer_tsumo_split() {
        let p = calculate_payment(3, 30, false, true, 0);
        assert_eq!(p.tsumo_dealer, 2000);
        assert_eq!(p.tsumo_non_dealer, 1000);
        assert_eq!(p.total, 4000);
    }

    #[test]
    fn honba_bonus() {
        let ron = calculate_payment(1, 30, false, false, 2);
        assert_eq!(ron.ron, 1600);
        let tsumo = calculate_payment(1, 30, false, true, 1);
        assert_eq!(tsumo.tsumo_dealer, 600);
        assert_eq!(tsumo.tsumo_non_dealer, 400);
    }

    #[test]
    fn limits_and_yakuman() {
        assert_eq!(calculate_payment(6, 30, false, false, 0).ron, 12000);
        assert_eq!(calculate_payment(8, 30, false, false, 0).ron, 16000);
        assert_eq!(calculate_payment(11, 30, false, false, 0).ron, 24000);
        assert_eq!(calculate_payment(13, 30, false, false, 0).ron, 32000);
        assert_eq!(yakuman_payment(1, true, false, 0).ron, 48000);
        assert_eq!(yakuman_payment(2, false, false, 0).ron, 64000);
    }

    #[test]
    fn dealer_rotation() {
        let mut score = Score::new(25000);
        score.advance(true, false);
        assert_eq!((score.dealer, score.honba, score.round), (0, 1, 1));
        score.advance(false, true);
        assert_eq!((score.dealer, score.honba), (1, 2));
        score.advance(false, false);
        assert_eq!((score.dealer, score.honba), (2, 0));
        score.advance(false, false);
        score.advance(false, false);
        assert_eq!((score.dealer, score.round_wind), (0, 1));
    }

    #[test]
    fn game_over_rules() {
        let mut score = Score::new(25000);
        assert!(!score.is_game_over(GameMode::East));
        score.scores = [40000, 10000, 25000, 25000];
        assert!(!score.is_game_over(GameMode::East));
        score.scores = [25000; 4];
        score.round = 1;
        assert!(score.is_game_over(GameMode::Single));

        // East over but nobody reached the target: continue into south.
        score.round_wind = 1;
        assert!(!score.is_game_over(GameMode::East));
        score.scores = [31000, 19000, 25000, 25000];
        assert!(score.is_game_over(GameMode::East));
        assert!(!score.is_game_over(GameMode::Half));

        score.scores = [25000; 4];
        score.round_wind = 2;
        assert!(score.is_game_over(GameMode::East));

        let mut bust = Score::new(25000);
        bust.scores[2] = -100;
        assert!(bust.is_game_over(GameMode::Half));
    }

    #[test]
    fn deposits_move_to_winner() {
        let mut score = Score::new(25000);
        score.take_deposit(1);
        score.take_deposit(2);
        assert_eq!(score.table_total(), 100000);
        assert_eq!(score.pay_out_deposits(3), 2000);
        assert_eq!(score.scores, [25000, 24000, 24000, 27000]);
        assert_eq!(score.riichi_sticks, 0);
    }
}
