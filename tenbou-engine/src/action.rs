use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tile::Tile;
use crate::types::Meld;

/// Size of the index space produced by [`Action::encode`].
pub const ACTION_SPACE: usize = 82;

pub const RIICHI_SLOT: u8 = 37;
pub const CHI_LOW_SLOT: u8 = 38;
pub const PON_SLOT: u8 = 41;
pub const KAN_SLOT_START: u8 = 42;
pub const WIN_SLOT: u8 = 79;
pub const NINE_TERMINALS_SLOT: u8 = 80;
pub const PASS_SLOT: u8 = 81;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Discard,
    Riichi,
    Tsumo,
    Ron,
    Chi,
    Pon,
    Daiminkan,
    Ankan,
    Kakan,
    Pass,
    NineTerminals,
}

impl ActionKind {
    /// Ranking among claims on a discard. Higher wins.
    pub const fn claim_priority(self) -> u8 {
        match self {
            ActionKind::Ron => 3,
            ActionKind::Pon | ActionKind::Daiminkan => 2,
            ActionKind::Chi => 1,
            _ => 0,
        }
    }
}

/// A move by one seat. Values come from the constructors below or from the
/// legal set handed out by the game state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    #[non_exhaustive]
    Discard { seat: u8, tile: Tile },
    #[non_exhaustive]
    Riichi { seat: u8 },
    #[non_exhaustive]
    Tsumo { seat: u8 },
    #[non_exhaustive]
    Ron { seat: u8 },
    #[non_exhaustive]
    Chi { seat: u8, meld: Meld },
    #[non_exhaustive]
    Pon { seat: u8, meld: Meld },
    #[non_exhaustive]
    Daiminkan { seat: u8, meld: Meld },
    #[non_exhaustive]
    Ankan { seat: u8, meld: Meld },
    /// `meld` is the upgraded quad; `meld.added_tile` is the tile from hand.
    #[non_exhaustive]
    Kakan { seat: u8, meld: Meld },
    #[non_exhaustive]
    Pass { seat: u8 },
    #[non_exhaustive]
    NineTerminals { seat: u8 },
}

impl Action {
    pub fn discard(seat: u8, tile: Tile) -> Self {
        Action::Discard { seat, tile }
    }

    pub fn riichi(seat: u8) -> Self {
        Action::Riichi { seat }
    }

    pub fn tsumo(seat: u8) -> Self {
        Action::Tsumo { seat }
    }

    pub fn ron(seat: u8) -> Self {
        Action::Ron { seat }
    }

    pub fn chi(seat: u8, meld: Meld) -> Self {
        Action::Chi { seat, meld }
    }

    pub fn pon(seat: u8, meld: Meld) -> Self {
        Action::Pon { seat, meld }
    }

    pub fn daiminkan(seat: u8, meld: Meld) -> Self {
        Action::Daiminkan { seat, meld }
    }

    pub fn ankan(seat: u8, meld: Meld) -> Self {
        Action::Ankan { seat, meld }
    }

    pub fn kakan(seat: u8, meld: Meld) -> Self {
        Action::Kakan { seat, meld }
    }

    pub fn pass(seat: u8) -> Self {
        Action::Pass { seat }
    }

    pub fn nine_terminals(seat: u8) -> Self {
        Action::NineTerminals { seat }
    }

    pub fn seat(&self) -> u8 {
        match *self {
            Action::Discard { seat, .. }
            | Action::Riichi { seat, .. }
            | Action::Tsumo { seat, .. }
            | Action::Ron { seat, .. }
            | Action::Chi { seat, .. }
            | Action::Pon { seat, .. }
            | Action::Daiminkan { seat, .. }
            | Action::Ankan { seat, .. }
            | Action::Kakan { seat, .. }
            | Action::Pass { seat, .. }
            | Action::NineTerminals { seat, .. } => seat,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Discard { .. } => ActionKind::Discard,
            Action::Riichi { .. } => ActionKind::Riichi,
            Action::Tsumo { .. } => ActionKind::Tsumo,
            Action::Ron { .. } => ActionKind::Ron,
            Action::Chi { .. } => ActionKind::Chi,
            Action::Pon { .. } => ActionKind::Pon,
            Action::Daiminkan { .. } => ActionKind::Daiminkan,
            Action::Ankan { .. } => ActionKind::Ankan,
            Action::Kakan { .. } => ActionKind::Kakan,
            Action::Pass { .. } => ActionKind::Pass,
            Action::NineTerminals { .. } => ActionKind::NineTerminals,
        }
    }

    /// The discarded tile, for discards only.
    pub fn tile(&self) -> Option<Tile> {
        match self {
            Action::Discard { tile, .. } => Some(*tile),
            _ => None,
        }
    }

    pub fn meld(&self) -> Option<&Meld> {
        match self {
            Action::Chi { meld, .. }
            | Action::Pon { meld, .. }
            | Action::Daiminkan { meld, .. }
            | Action::Ankan { meld, .. }
            | Action::Kakan { meld, .. } => Some(meld),
            _ => None,
        }
    }

    /// Membership in a legal set. Nothing else makes an action valid.
    pub fn is_valid(&self, legal: &[Action]) -> bool {
        legal.contains(self)
    }

    /// Slot in the fixed 82-entry index space used by learned agents.
    /// Several actions may share a slot (red and plain copies of a tile).
    pub fn encode(&self) -> u8 {
        match self {
            Action::Discard { tile, .. } => tile.kind(),
            Action::Riichi { .. } => RIICHI_SLOT,
            Action::Chi { meld, .. } => {
                let called = meld.called_tile.map(|t| t.kind()).unwrap_or_else(|| meld.base_kind());
                CHI_LOW_SLOT + called.saturating_sub(meld.base_kind()).min(2)
            }
            Action::Pon { .. } => PON_SLOT,
            Action::Daiminkan { meld, .. } | Action::Ankan { meld, .. } | Action::Kakan { meld, .. } => {
                KAN_SLOT_START + meld.base_kind()
            }
            Action::Tsumo { .. } | Action::Ron { .. } => WIN_SLOT,
            Action::NineTerminals { .. } => NINE_TERMINALS_SLOT,
            Action::Pass { .. } => PASS_SLOT,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seat = self.seat();
        match self {
            Action::Discard { tile, .. } => write!(f, "seat {} discards {}", seat, tile),
            Action::Riichi { .. } => write!(f, "seat {} declares riichi", seat),
            Action::Tsumo { .. } => write!(f, "seat {} wins by tsumo", seat),
            Action::Ron { .. } => write!(f, "seat {} wins by ron", seat),
            Action::Pass { .. } => write!(f, "seat {} passes", seat),
            Action::NineTerminals { .. } => write!(f, "seat {} declares nine terminals", seat),
            Action::Chi { meld, .. }
            | Action::Pon { meld, .. }
            | Action::Daiminkan { meld, .. }
            | Action::Ankan { meld, .. }
            | Action::Kakan { meld, .. } => {
                write!(f, "seat {} calls {:?} [", seat, self.kind())?;
                for (i, t) in meld.tiles.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, "]")
            }
        }
    }
}
