use serde::{Deserialize, Serialize};

use crate::tile::Tile;

pub const NUM_SEATS: usize = 4;

/// Clockwise distance from `from` to `to` (0 when equal).
#[inline]
pub const fn seat_distance(from: u8, to: u8) -> u8 {
    (to + NUM_SEATS as u8 - from) % NUM_SEATS as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Chi,
    Pon,
    Daiminkan,
    Ankan,
    Kakan,
}

impl MeldKind {
    #[inline]
    pub const fn is_kan(self) -> bool {
        matches!(self, MeldKind::Daiminkan | MeldKind::Ankan | MeldKind::Kakan)
    }
}

/// Represents wind directions, used for seat winds and the round wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Wind {
    #[default]
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Wind {
    /// Honor kind of this wind (27-30).
    pub const fn kind(self) -> u8 {
        crate::tile::EAST + self as u8
    }

    /// Seat wind of `seat` when `dealer` sits east.
    pub fn of_seat(seat: u8, dealer: u8) -> Wind {
        Wind::from(seat_distance(dealer, seat))
    }
}

impl From<u8> for Wind {
    fn from(val: u8) -> Self {
        match val % 4 {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            _ => Wind::North,
        }
    }
}

/// An exposed (or concealed-kan) group. `tiles` is sorted by id and includes
/// the called tile; for an added kan `added_tile` is the fourth tile taken
/// from the hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
    pub called_tile: Option<Tile>,
    pub from_seat: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_tile: Option<Tile>,
}

impl Meld {
    pub fn new(kind: MeldKind, mut tiles: Vec<Tile>, called_tile: Option<Tile>, from_seat: Option<u8>) -> Self {
        tiles.sort();
        Self {
            kind,
            tiles,
            called_tile,
            from_seat,
            added_tile: None,
        }
    }

    /// A claim on another seat's discard.
    pub fn called(kind: MeldKind, consumed: &[Tile], called_tile: Tile, from_seat: u8) -> Self {
        let mut tiles = consumed.to_vec();
        tiles.push(called_tile);
        Self::new(kind, tiles, Some(called_tile), Some(from_seat))
    }

    pub fn concealed_kan(tiles: Vec<Tile>) -> Self {
        Self::new(MeldKind::Ankan, tiles, None, None)
    }

    /// The added kan built from `pon` plus `tile`.
    pub fn upgraded(pon: &Meld, tile: Tile) -> Self {
        let mut tiles = pon.tiles.clone();
        tiles.push(tile);
        let mut meld = Self::new(MeldKind::Kakan, tiles, pon.called_tile, pon.from_seat);
        meld.added_tile = Some(tile);
        meld
    }

    /// Kind of the lowest tile (the base of a chi, the kind of a set).
    pub fn base_kind(&self) -> u8 {
        self.tiles.first().map(|t| t.kind()).unwrap_or(0)
    }

    pub fn is_open(&self) -> bool {
        self.kind != MeldKind::Ankan
    }

    /// Tiles that came out of the caller's hand.
    pub fn consumed(&self) -> Vec<Tile> {
        self.tiles
            .iter()
            .copied()
            .filter(|t| Some(*t) != self.called_tile)
            .collect()
    }
}
