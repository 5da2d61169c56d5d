//! Physical tile identities.
//!
//! A table holds 136 physical tiles: 34 kinds with 4 copies each. A [`Tile`]
//! is one physical copy (`0..136`); its kind is `id / 4`. The 0th copy of
//! each suited five (ids 16, 52, 88) is the red five.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of distinct tile kinds (0-33).
pub const NUM_KINDS: usize = 34;

/// Number of physical tiles on the table.
pub const NUM_TILES: usize = 136;

/// Number of ranks in a suit.
pub const SUIT_LEN: u8 = 9;

pub const MANZU_START: u8 = 0;
pub const PINZU_START: u8 = 9;
pub const SOUZU_START: u8 = 18;
pub const HONOR_START: u8 = 27;

pub const EAST: u8 = 27;
pub const SOUTH: u8 = 28;
pub const WEST: u8 = 29;
pub const NORTH: u8 = 30;
pub const HAKU: u8 = 31;
pub const HATSU: u8 = 32;
pub const CHUN: u8 = 33;

/// Red 5m. The 0th copy of kind 4.
pub const RED_MANZU: u8 = 16;
/// Red 5p. The 0th copy of kind 13.
pub const RED_PINZU: u8 = 52;
/// Red 5s. The 0th copy of kind 22.
pub const RED_SOUZU: u8 = 88;

/// Kinds that count for thirteen orphans and nine-terminals.
pub const TERMINAL_HONOR_KINDS: [u8; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];

const KIND_NAMES: [&str; NUM_KINDS] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", "1p", "2p", "3p", "4p", "5p", "6p", "7p",
    "8p", "9p", "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s", "E", "S", "W", "N", "P", "F",
    "C",
];

// ---------------------------------------------------------------------------
// Suit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Manzu = 0,
    Pinzu = 1,
    Souzu = 2,
    Honor = 3,
}

impl Suit {
    #[inline]
    pub const fn of_kind(kind: u8) -> Suit {
        match kind {
            0..9 => Suit::Manzu,
            9..18 => Suit::Pinzu,
            18..27 => Suit::Souzu,
            _ => Suit::Honor,
        }
    }
}

// ---------------------------------------------------------------------------
// Kind helpers
// ---------------------------------------------------------------------------

/// 1-based rank within the suit, or `None` for honors.
#[inline]
pub const fn kind_rank(kind: u8) -> Option<u8> {
    if kind < HONOR_START {
        Some(kind % SUIT_LEN + 1)
    } else {
        None
    }
}

#[inline]
pub const fn kind_is_honor(kind: u8) -> bool {
    kind >= HONOR_START
}

#[inline]
pub const fn kind_is_terminal(kind: u8) -> bool {
    kind < HONOR_START && (kind % SUIT_LEN == 0 || kind % SUIT_LEN == 8)
}

/// Terminal or honor (yaochuuhai).
#[inline]
pub const fn kind_is_yaochuu(kind: u8) -> bool {
    kind_is_terminal(kind) || kind_is_honor(kind)
}

#[inline]
pub const fn kind_is_dragon(kind: u8) -> bool {
    kind >= HAKU && kind <= CHUN
}

#[inline]
pub const fn kind_is_wind(kind: u8) -> bool {
    kind >= EAST && kind <= NORTH
}

/// The kind a dora indicator points at: the next rank in the suit (9 wraps
/// to 1), the next wind (N wraps to E), or the next dragon (C wraps to P).
#[inline]
pub const fn next_dora_kind(indicator_kind: u8) -> u8 {
    if indicator_kind < HONOR_START {
        let base = indicator_kind - indicator_kind % SUIT_LEN;
        base + (indicator_kind % SUIT_LEN + 1) % SUIT_LEN
    } else if indicator_kind <= NORTH {
        EAST + (indicator_kind - EAST + 1) % 4
    } else {
        HAKU + (indicator_kind - HAKU + 1) % 3
    }
}

/// Short name of a kind ("1m", "5z"). Out-of-range kinds render as "??".
#[inline]
pub fn kind_name(kind: u8) -> &'static str {
    KIND_NAMES.get(kind as usize).copied().unwrap_or("??")
}

/// Histogram of tile kinds.
pub fn kind_counts(tiles: &[Tile]) -> [u8; NUM_KINDS] {
    let mut counts = [0u8; NUM_KINDS];
    for t in tiles {
        counts[t.kind() as usize] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One physical tile. Equality and ordering are by id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tile(u8);

impl Tile {
    /// Creates a tile if `id` is in `0..136`.
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < NUM_TILES {
            Some(Tile(id))
        } else {
            None
        }
    }

    /// Every physical tile in id order.
    pub fn all() -> impl Iterator<Item = Tile> {
        (0..NUM_TILES as u8).map(Tile)
    }

    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn kind(self) -> u8 {
        self.0 / 4
    }

    #[inline]
    pub const fn suit(self) -> Suit {
        Suit::of_kind(self.kind())
    }

    #[inline]
    pub const fn rank(self) -> Option<u8> {
        kind_rank(self.kind())
    }

    #[inline]
    pub const fn is_red(self) -> bool {
        matches!(self.0, RED_MANZU | RED_PINZU | RED_SOUZU)
    }

    #[inline]
    pub const fn is_honor(self) -> bool {
        kind_is_honor(self.kind())
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        kind_is_terminal(self.kind())
    }

    #[inline]
    pub const fn is_yaochuu(self) -> bool {
        kind_is_yaochuu(self.kind())
    }
}

impl TryFrom<u8> for Tile {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Tile::new(id).ok_or_else(|| format!("tile id {} out of range 0..136", id))
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> u8 {
        tile.0
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_red() {
            let suit = match self.suit() {
                Suit::Manzu => "m",
                Suit::Pinzu => "p",
                _ => "s",
            };
            write!(f, "0{}", suit)
        } else {
            f.write_str(kind_name(self.kind()))
        }
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tile({}={})", self.0, self)
    }
}
