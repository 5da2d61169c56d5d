use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::score::{calculate_payment, round_up_fu, yakuman_payment, PointPayment};
use crate::yaku::Yaku;

/// Accumulates the scoring factors of one winning hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningScore {
    fan: BTreeMap<Yaku, u8>,
    yakuman: BTreeMap<Yaku, bool>,
    fu: Option<u8>,
}

impl WinningScore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or overwrites) a fan-bearing factor. Zero fan is ignored.
    pub fn add_yaku(&mut self, yaku: Yaku, fan: u8) {
        if fan > 0 {
            self.fan.insert(yaku, fan);
        }
    }

    pub fn add_yakuman(&mut self, yaku: Yaku) {
        self.yakuman.insert(yaku, true);
    }

    pub fn set_fu(&mut self, fu: u8) {
        self.fu = Some(fu);
    }

    pub fn fu(&self) -> Option<u8> {
        self.fu
    }

    pub fn fan(&self) -> &BTreeMap<Yaku, u8> {
        &self.fan
    }

    pub fn yakuman(&self) -> impl Iterator<Item = Yaku> + '_ {
        self.yakuman.iter().filter(|(_, &on)| on).map(|(&y, _)| y)
    }

    pub fn yakuman_count(&self) -> u8 {
        self.yakuman.values().filter(|&&on| on).count() as u8
    }

    pub fn total_fan(&self) -> u8 {
        self.fan.values().fold(0u8, |acc, &f| acc.saturating_add(f))
    }

    /// True when nothing but dora supports the hand.
    pub fn require_fan(&self) -> bool {
        self.yakuman_count() == 0 && !self.fan.keys().any(|y| !y.is_dora())
    }

    /// True when the fan alone does not fix the payment and fu is missing.
    pub fn require_fu(&self) -> bool {
        self.yakuman_count() == 0 && self.total_fan() < 5 && self.fu.is_none()
    }

    pub fn is_complete(&self) -> bool {
        !self.require_fan() && !self.require_fu()
    }

    /// Payment for this hand, or `None` while a factor is missing.
    pub fn payment(&self, is_dealer: bool, is_tsumo: bool, honba: u32) -> Option<PointPayment> {
        if self.yakuman_count() > 0 {
            return Some(yakuman_payment(self.yakuman_count(), is_dealer, is_tsumo, honba));
        }
        if !self.is_complete() {
            return None;
        }
        Some(calculate_payment(
            self.total_fan(),
            self.fu.unwrap_or(30),
            is_dealer,
            is_tsumo,
            honba,
        ))
    }

    /// Base points used to compare alternative readings of one hand.
    pub(crate) fn value(&self) -> u32 {
        if self.yakuman_count() > 0 {
            return 8000 * self.yakuman_count() as u32 * 10;
        }
        if self.require_fan() {
            return 0;
        }
        let han = self.total_fan();
        let base = match han {
            0..=4 => {
                let fu = round_up_fu(self.fu.unwrap_or(30)) as u32;
                (fu * 2u32.pow(2 + han as u32)).min(2000)
            }
            5 => 2000,
            6 | 7 => 3000,
            8..=10 => 4000,
            11 | 12 => 6000,
            _ => 8000,
        };
        base * 10 + han as u32
    }
}
