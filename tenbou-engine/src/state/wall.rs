//! The shuffled wall and its fixed ranges.
//!
//! ```text
//! [0, 52)     deal: seat (dealer + k) % 4 receives [13k, 13k + 13)
//! [52, 122)   live draws, shortened from the end by one per replacement draw
//! [122, 126)  replacement draws after a kan
//! 126         dora indicator, [127, 131) kan dora indicators
//! 131         ura indicator, [132, 136) kan ura indicators
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::errors::{EngineError, EngineResult};
use crate::tile::{Tile, NUM_TILES};
use crate::types::NUM_SEATS;

pub const DEAL_END: usize = 52;
pub const LIVE_END: usize = 122;
pub const REPLACEMENT_END: usize = 126;
pub const DORA_START: usize = 126;
pub const URA_START: usize = 131;
pub const MAX_REPLACEMENTS: usize = REPLACEMENT_END - LIVE_END;
pub const HAND_SIZE: usize = 13;

/// Fisher-Yates over any slice. Vendored so that a `rand` upgrade cannot
/// change the sequence a seed produces.
pub fn fisher_yates_shuffle<T>(slice: &mut [T], rng: &mut impl Rng) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// SHA-256 of the seed bytes, used as the ChaCha key.
fn wall_key(seed: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"tenbou-wall");
    hasher.update(seed.to_le_bytes());
    hasher.finalize().into()
}

/// Seed of one round's wall: `SHA-256(game_seed || round || honba)`.
pub fn derive_round_seed(game_seed: u64, round: u32, honba: u8) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(game_seed.to_le_bytes());
    hasher.update(round.to_le_bytes());
    hasher.update([honba]);
    let digest: [u8; 32] = hasher.finalize().into();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wall {
    tiles: Vec<Tile>,
    seed: Option<u64>,
    live_cursor: usize,
    replacement_cursor: usize,
    dora_revealed: usize,
}

impl Wall {
    /// Deterministic shuffle of all 136 tiles.
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::from_seed(wall_key(seed));
        let mut tiles: Vec<Tile> = Tile::all().collect();
        fisher_yates_shuffle(&mut tiles, &mut rng);
        let mut wall = Self::with_order(tiles);
        wall.seed = Some(seed);
        wall
    }

    /// A wall in a given order, which must be a permutation of all tiles.
    pub fn from_tiles(tiles: Vec<Tile>) -> EngineResult<Self> {
        if tiles.len() != NUM_TILES {
            return Err(EngineError::Configuration {
                message: format!("wall must hold {} tiles, got {}", NUM_TILES, tiles.len()),
            });
        }
        let mut seen = [false; NUM_TILES];
        for t in &tiles {
            if std::mem::replace(&mut seen[t.id() as usize], true) {
                return Err(EngineError::Configuration {
                    message: format!("tile {} appears twice in the wall", t.id()),
                });
            }
        }
        Ok(Self::with_order(tiles))
    }

    fn with_order(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            seed: None,
            live_cursor: DEAL_END,
            replacement_cursor: LIVE_END,
            dora_revealed: 1,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Hands indexed by seat: seat `(dealer + k) % 4` gets `[13k, 13k + 13)`.
    pub fn deal(&self, dealer: u8) -> [Vec<Tile>; NUM_SEATS] {
        let mut hands: [Vec<Tile>; NUM_SEATS] = Default::default();
        for k in 0..NUM_SEATS {
            let seat = (dealer as usize + k) % NUM_SEATS;
            hands[seat] = self.tiles[k * HAND_SIZE..(k + 1) * HAND_SIZE].to_vec();
        }
        hands
    }

    fn live_end(&self) -> usize {
        LIVE_END - self.replacements_drawn()
    }

    pub fn replacements_drawn(&self) -> usize {
        self.replacement_cursor - LIVE_END
    }

    pub fn live_remaining(&self) -> usize {
        self.live_end().saturating_sub(self.live_cursor)
    }

    pub fn draw(&mut self) -> EngineResult<Tile> {
        if self.live_cursor >= self.live_end() {
            return Err(EngineError::WallExhausted);
        }
        let tile = self.tiles[self.live_cursor];
        self.live_cursor += 1;
        Ok(tile)
    }

    /// Tile after a kan. Also takes one tile off the end of the live range.
    pub fn draw_replacement(&mut self) -> EngineResult<Tile> {
        if self.replacement_cursor >= REPLACEMENT_END || self.live_remaining() == 0 {
            return Err(EngineError::NoReplacementTilesLeft);
        }
        let tile = self.tiles[self.replacement_cursor];
        self.replacement_cursor += 1;
        Ok(tile)
    }

    pub fn replacements_left(&self) -> usize {
        REPLACEMENT_END - self.replacement_cursor
    }

    /// Turns over the next kan dora indicator.
    pub fn reveal_dora(&mut self) -> EngineResult<Tile> {
        if self.dora_revealed > MAX_REPLACEMENTS {
            return Err(EngineError::invariant("all dora indicators are already revealed"));
        }
        let tile = self.tiles[DORA_START + self.dora_revealed];
        self.dora_revealed += 1;
        Ok(tile)
    }

    pub fn dora_indicators(&self) -> &[Tile] {
        &self.tiles[DORA_START..DORA_START + self.dora_revealed]
    }

    /// Ura indicators under the revealed dora. Settlement only.
    pub fn ura_indicators(&self) -> &[Tile] {
        &self.tiles[URA_START..URA_START + self.dora_revealed]
    }

    /// Tiles no seat has taken: the rest of the live range (including the
    /// part cut off by replacement draws) and the dead wall.
    pub fn undrawn(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles[self.live_cursor..LIVE_END]
            .iter()
            .chain(self.tiles[self.replacement_cursor..].iter())
            .copied()
    }
}
