use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};
use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiverEntry {
    pub tile: Tile,
    /// Taken by another seat's call.
    pub called: bool,
    /// The tile that declared riichi.
    pub riichi: bool,
    /// Discarded straight after drawing it.
    pub tsumogiri: bool,
}

/// One seat's discards in order. Entries are never removed; only the
/// `called` flag may change, and only from false to true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct River {
    entries: Vec<RiverEntry>,
}

impl River {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, tile: Tile, riichi: bool, tsumogiri: bool) -> usize {
        self.entries.push(RiverEntry {
            tile,
            called: false,
            riichi,
            tsumogiri,
        });
        self.entries.len() - 1
    }

    pub fn mark_called(&mut self, index: usize) -> EngineResult<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| EngineError::invariant(format!("no river entry at {}", index)))?;
        if entry.called {
            return Err(EngineError::invariant(format!(
                "river entry {} ({}) was already called",
                index, entry.tile
            )));
        }
        entry.called = true;
        Ok(())
    }

    pub fn entries(&self) -> &[RiverEntry] {
        &self.entries
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.entries.iter().map(|e| e.tile)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&RiverEntry> {
        self.entries.last()
    }

    /// Includes called entries: a called tile still makes its discarder furiten.
    pub fn contains_kind(&self, kind: u8) -> bool {
        self.entries.iter().any(|e| e.tile.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tiles;

    #[test]
    fn append_and_call() {
        let tiles = parse_tiles("19m5z").unwrap();
        let mut river = River::new();
        assert_eq!(river.append(tiles[0], false, true), 0);
        assert_eq!(river.append(tiles[1], true, false), 1);
        river.mark_called(1).unwrap();
        assert!(river.entries()[1].called);
        assert!(river.entries()[1].riichi);
        assert!(river.mark_called(1).is_err());
        assert!(river.mark_called(5).is_err());
        assert_eq!(river.tiles().collect::<Vec<_>>(), tiles[..2].to_vec());
    }

    #[test]
    fn furiten_lookup_by_kind() {
        let tiles = parse_tiles("3p").unwrap();
        let mut river = River::new();
        river.append(tiles[0], false, false);
        river.mark_called(0).unwrap();
        assert!(river.contains_kind(11));
        assert!(!river.contains_kind(12));
    }
}
