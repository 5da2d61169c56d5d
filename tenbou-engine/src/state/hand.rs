use serde::{Deserialize, Serialize};

use crate::agari::{self, Counts};
use crate::errors::{EngineError, EngineResult};
use crate::tile::{kind_counts, Tile, HONOR_START, TERMINAL_HONOR_KINDS};
use crate::types::{Meld, MeldKind, NUM_SEATS};
use crate::winning_score::WinningScore;
use crate::yaku::{self, WinContext};

/// Options for [`Hand::legal_calls`] that depend on the table, not the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Whether an open kan is still possible (kan count and replacement tiles).
    pub allow_kan: bool,
    pub kuikae_forbidden: bool,
}

/// Kinds a seat may not discard right after making `meld`.
pub fn swap_call_kinds(meld: &Meld) -> Vec<u8> {
    let Some(called) = meld.called_tile.map(|t| t.kind()) else {
        return Vec::new();
    };
    match meld.kind {
        MeldKind::Pon => vec![called],
        MeldKind::Chi => {
            let mut kinds = vec![called];
            let low = meld.base_kind();
            let rank = called % 9;
            if called == low && rank <= 5 {
                kinds.push(called + 3);
            } else if called == low + 2 && rank >= 3 {
                kinds.push(called - 3);
            }
            kinds
        }
        _ => Vec::new(),
    }
}

/// One seat's tiles. A quad counts as three, so the count is 13 between
/// turns and 14 while the seat must discard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    concealed: Vec<Tile>,
    melds: Vec<Meld>,
    riichi: bool,
    drawn: Option<Tile>,
    forbidden: Vec<u8>,
}

impl Hand {
    pub fn new(mut tiles: Vec<Tile>) -> Self {
        tiles.sort();
        Self {
            concealed: tiles,
            ..Default::default()
        }
    }

    pub fn with_melds(tiles: Vec<Tile>, melds: Vec<Meld>) -> Self {
        let mut hand = Self::new(tiles);
        hand.melds = melds;
        hand
    }

    pub fn concealed(&self) -> &[Tile] {
        &self.concealed
    }

    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }

    pub fn is_riichi(&self) -> bool {
        self.riichi
    }

    /// Closed iff every meld is a concealed kan.
    pub fn is_closed(&self) -> bool {
        self.melds.iter().all(|m| !m.is_open())
    }

    pub fn drawn_tile(&self) -> Option<Tile> {
        self.drawn
    }

    pub fn forbidden_kinds(&self) -> &[u8] {
        &self.forbidden
    }

    pub fn tile_count(&self) -> usize {
        self.concealed.len() + 3 * self.melds.len()
    }

    pub fn kan_count(&self) -> usize {
        self.melds.iter().filter(|m| m.kind.is_kan()).count()
    }

    pub fn counts(&self) -> Counts {
        kind_counts(&self.concealed)
    }

    /// Every tile the hand owns, concealed and melded.
    pub fn all_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.concealed
            .iter()
            .copied()
            .chain(self.melds.iter().flat_map(|m| m.tiles.iter().copied()))
    }

    fn expect_count(&self, expected: usize, op: &str) -> EngineResult<()> {
        if self.tile_count() != expected {
            return Err(EngineError::invariant(format!(
                "{} needs {} tiles, hand holds {}",
                op,
                expected,
                self.tile_count()
            )));
        }
        Ok(())
    }

    fn insert(&mut self, tile: Tile) {
        let pos = self.concealed.partition_point(|&t| t < tile);
        self.concealed.insert(pos, tile);
    }

    fn remove_all(&mut self, tiles: &[Tile]) -> EngineResult<()> {
        if let Some(missing) = tiles.iter().find(|t| !self.concealed.contains(t)) {
            return Err(EngineError::invariant(format!("tile {} is not in the hand", missing)));
        }
        self.concealed.retain(|t| !tiles.contains(t));
        Ok(())
    }

    // -----------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------

    pub fn draw(&mut self, tile: Tile) -> EngineResult<()> {
        self.expect_count(13, "draw")?;
        self.insert(tile);
        self.drawn = Some(tile);
        Ok(())
    }

    pub fn discard(&mut self, tile: Tile) -> EngineResult<Tile> {
        self.expect_count(14, "discard")?;
        self.remove_all(&[tile])?;
        self.drawn = None;
        self.forbidden.clear();
        Ok(tile)
    }

    /// Moves the tiles of `meld` out of the concealed part. An added kan
    /// replaces the pon it extends.
    pub fn apply_meld(&mut self, meld: &Meld) -> EngineResult<()> {
        match meld.kind {
            MeldKind::Chi | MeldKind::Pon | MeldKind::Daiminkan => {
                self.expect_count(13, "call")?;
                self.remove_all(&meld.consumed())?;
                self.melds.push(meld.clone());
            }
            MeldKind::Ankan => {
                self.expect_count(14, "concealed kan")?;
                self.remove_all(&meld.tiles)?;
                self.melds.push(meld.clone());
            }
            MeldKind::Kakan => {
                self.expect_count(14, "added kan")?;
                let added = meld
                    .added_tile
                    .ok_or_else(|| EngineError::invariant("added kan without its added tile"))?;
                let idx = self
                    .melds
                    .iter()
                    .position(|m| m.kind == MeldKind::Pon && m.base_kind() == added.kind())
                    .ok_or_else(|| EngineError::invariant(format!("no pon to extend with {}", added)))?;
                self.remove_all(&[added])?;
                self.melds[idx] = meld.clone();
            }
        }
        self.drawn = None;
        Ok(())
    }

    pub fn declare_riichi(&mut self) {
        self.riichi = true;
    }

    pub fn forbid(&mut self, kinds: Vec<u8>) {
        self.forbidden = kinds;
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn is_tenpai(&self) -> bool {
        self.tile_count() == 13 && agari::is_tenpai(&self.counts())
    }

    pub fn waits(&self) -> Vec<u8> {
        if self.tile_count() != 13 {
            return Vec::new();
        }
        agari::waits(&self.counts())
    }

    pub fn legal_discards(&self) -> Vec<Tile> {
        if self.tile_count() != 14 {
            return Vec::new();
        }
        if self.riichi {
            return self.drawn.into_iter().collect();
        }
        let allowed: Vec<Tile> = self
            .concealed
            .iter()
            .copied()
            .filter(|t| !self.forbidden.contains(&t.kind()))
            .collect();
        if allowed.is_empty() {
            self.concealed.clone()
        } else {
            allowed
        }
    }

    /// Discards that leave a closed hand tenpai.
    pub fn riichi_discards(&self) -> Vec<Tile> {
        if self.riichi || !self.is_closed() || self.tile_count() != 14 {
            return Vec::new();
        }
        let counts = self.counts();
        let mut keeps = [false; 34];
        let mut checked = [false; 34];
        let mut result = Vec::new();
        for &t in &self.concealed {
            let k = t.kind() as usize;
            if !checked[k] {
                checked[k] = true;
                let mut after = counts;
                after[k] -= 1;
                keeps[k] = agari::is_tenpai(&after);
            }
            if keeps[k] {
                result.push(t);
            }
        }
        result
    }

    pub fn can_declare_riichi(&self) -> bool {
        !self.riichi && self.is_closed() && !self.riichi_discards().is_empty()
    }

    /// Scores a self-drawn win on the last drawn tile.
    pub fn evaluate_tsumo(&self, ctx: &WinContext) -> Option<WinningScore> {
        let win = self.drawn?;
        if self.tile_count() != 14 {
            return None;
        }
        yaku::evaluate(&self.concealed, &self.melds, win, ctx)
    }

    /// Scores a win on another seat's tile.
    pub fn evaluate_ron(&self, tile: Tile, ctx: &WinContext) -> Option<WinningScore> {
        if self.tile_count() != 13 {
            return None;
        }
        let mut tiles = self.concealed.clone();
        tiles.push(tile);
        yaku::evaluate(&tiles, &self.melds, tile, ctx)
    }

    /// Winning shape with at least one yaku besides dora.
    pub fn can_declare_tsumo(&self, ctx: &WinContext) -> bool {
        self.evaluate_tsumo(ctx).is_some_and(|ws| ws.is_complete())
    }

    pub fn can_declare_ron(&self, tile: Tile, ctx: &WinContext) -> bool {
        self.evaluate_ron(tile, ctx).is_some_and(|ws| ws.is_complete())
    }

    /// Nine distinct terminal or honor kinds right after the first draw.
    pub fn has_nine_terminals(&self) -> bool {
        if self.tile_count() != 14 || !self.melds.is_empty() {
            return false;
        }
        let counts = self.counts();
        TERMINAL_HONOR_KINDS
            .iter()
            .filter(|&&k| counts[k as usize] > 0)
            .count()
            >= 9
    }

    /// Concealed kans available on the seat's own turn. A riichi hand may
    /// only kan the drawn kind, and only if its waits stay the same.
    pub fn closed_kans(&self) -> Vec<Meld> {
        if self.tile_count() != 14 {
            return Vec::new();
        }
        let counts = self.counts();
        let mut result = Vec::new();
        for kind in 0..34u8 {
            if counts[kind as usize] != 4 {
                continue;
            }
            if self.riichi && !self.riichi_kan_keeps_waits(kind, &counts) {
                continue;
            }
            let tiles: Vec<Tile> = self.concealed.iter().copied().filter(|t| t.kind() == kind).collect();
            result.push(Meld::concealed_kan(tiles));
        }
        result
    }

    fn riichi_kan_keeps_waits(&self, kind: u8, counts: &Counts) -> bool {
        let Some(drawn) = self.drawn else {
            return false;
        };
        if drawn.kind() != kind {
            return false;
        }
        let mut before = *counts;
        before[kind as usize] -= 1;
        let mut after = *counts;
        after[kind as usize] = 0;
        let waits_before = agari::waits(&before);
        !waits_before.is_empty() && waits_before == agari::waits(&after)
    }

    /// Pons that can be extended with a concealed tile.
    pub fn added_kans(&self) -> Vec<Meld> {
        if self.riichi || self.tile_count() != 14 {
            return Vec::new();
        }
        self.melds
            .iter()
            .filter(|m| m.kind == MeldKind::Pon)
            .filter_map(|pon| {
                self.concealed
                    .iter()
                    .find(|t| t.kind() == pon.base_kind())
                    .map(|&t| Meld::upgraded(pon, t))
            })
            .collect()
    }

    /// One plain copy and the red copy of `kind`, whichever the hand holds.
    fn representatives(&self, kind: u8) -> Vec<Tile> {
        let mut reps = Vec::new();
        if let Some(&plain) = self.concealed.iter().find(|t| t.kind() == kind && !t.is_red()) {
            reps.push(plain);
        }
        if let Some(&red) = self.concealed.iter().find(|t| t.kind() == kind && t.is_red()) {
            reps.push(red);
        }
        reps
    }

    fn swap_call_ok(&self, meld: &Meld, opts: CallOptions) -> bool {
        if !opts.kuikae_forbidden {
            return true;
        }
        let forbidden = swap_call_kinds(meld);
        let consumed = meld.consumed();
        self.concealed
            .iter()
            .any(|t| !consumed.contains(t) && !forbidden.contains(&t.kind()))
    }

    /// Calls this seat can make on `tile` discarded by `from_seat`.
    pub fn legal_calls(&self, tile: Tile, from_seat: u8, own_seat: u8, opts: CallOptions) -> Vec<Meld> {
        if self.riichi || self.tile_count() != 13 || from_seat == own_seat {
            return Vec::new();
        }
        let kind = tile.kind();
        let mut result = Vec::new();

        let same: Vec<Tile> = self.concealed.iter().copied().filter(|t| t.kind() == kind).collect();
        let mut seen_red_counts = Vec::new();
        for i in 0..same.len() {
            for j in i + 1..same.len() {
                let reds = same[i].is_red() as u8 + same[j].is_red() as u8;
                if seen_red_counts.contains(&reds) {
                    continue;
                }
                seen_red_counts.push(reds);
                let meld = Meld::called(MeldKind::Pon, &[same[i], same[j]], tile, from_seat);
                if self.swap_call_ok(&meld, opts) {
                    result.push(meld);
                }
            }
        }
        if opts.allow_kan && same.len() == 3 {
            result.push(Meld::called(MeldKind::Daiminkan, &same, tile, from_seat));
        }

        let is_next = own_seat == (from_seat + 1) % NUM_SEATS as u8;
        if is_next && kind < HONOR_START {
            let rank = kind % 9;
            let mut patterns = Vec::new();
            if rank >= 2 {
                patterns.push((kind - 2, kind - 1));
            }
            if (1..=7).contains(&rank) {
                patterns.push((kind - 1, kind + 1));
            }
            if rank <= 6 {
                patterns.push((kind + 1, kind + 2));
            }
            for (a, b) in patterns {
                for x in self.representatives(a) {
                    for y in self.representatives(b) {
                        let meld = Meld::called(MeldKind::Chi, &[x, y], tile, from_seat);
                        if self.swap_call_ok(&meld, opts) {
                            result.push(meld);
                        }
                    }
                }
            }
        }
        result
    }
}
