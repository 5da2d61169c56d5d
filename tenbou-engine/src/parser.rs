//! Compact hand notation (`123m456p789s11z`, `0` for a red five).

use crate::errors::{EngineError, EngineResult};
use crate::tile::{Tile, NUM_KINDS};

/// Hands out physical copies so that several strings parsed with one picker
/// never reuse a tile id.
#[derive(Debug, Clone)]
pub struct TilePicker {
    used: [[bool; 4]; NUM_KINDS],
}

impl Default for TilePicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TilePicker {
    pub fn new() -> Self {
        Self {
            used: [[false; 4]; NUM_KINDS],
        }
    }

    /// Takes the next free copy of `kind`. Plain fives avoid the red copy
    /// until the other three are used.
    pub fn pick(&mut self, kind: u8, red: bool) -> Result<Tile, String> {
        if kind as usize >= NUM_KINDS {
            return Err(format!("Invalid tile kind: {}", kind));
        }
        let is_five = kind == 4 || kind == 13 || kind == 22;
        let search: &[usize] = match (is_five, red) {
            (true, true) => &[0],
            (true, false) => &[1, 2, 3, 0],
            (false, _) => &[0, 1, 2, 3],
        };
        let copy = search
            .iter()
            .find(|&&idx| !self.used[kind as usize][idx])
            .copied()
            .ok_or_else(|| format!("No more copies of kind {}", kind))?;
        self.used[kind as usize][copy] = true;
        Tile::new(kind * 4 + copy as u8).ok_or_else(|| format!("Invalid tile kind: {}", kind))
    }

    /// Whether this picker already handed out `tile`.
    pub fn is_used(&self, tile: Tile) -> bool {
        self.used[tile.kind() as usize][(tile.id() % 4) as usize]
    }

    pub fn parse(&mut self, text: &str) -> EngineResult<Vec<Tile>> {
        let parse_err = |message: String| EngineError::Parse {
            input: text.to_string(),
            message,
        };
        let mut tiles = Vec::new();
        let mut pending: Vec<u8> = Vec::new();
        for c in text.chars() {
            if let Some(d) = c.to_digit(10) {
                pending.push(d as u8);
                continue;
            }
            let offset = match c {
                'm' => 0,
                'p' => 9,
                's' => 18,
                'z' => 27,
                ' ' | '_' => continue,
                other => return Err(parse_err(format!("Unexpected character '{}'", other))),
            };
            for &d in &pending {
                let (kind, red) = match d {
                    0 if offset < 27 => (offset + 4, true),
                    1..=7 if offset == 27 => (offset + d - 1, false),
                    1..=9 if offset < 27 => (offset + d - 1, false),
                    _ => return Err(parse_err(format!("Invalid digit {} for suit '{}'", d, c))),
                };
                tiles.push(self.pick(kind, red).map_err(&parse_err)?);
            }
            pending.clear();
        }
        if !pending.is_empty() {
            return Err(parse_err("Pending digits without suit".to_string()));
        }
        Ok(tiles)
    }
}

/// Parses a tile string into physical tiles, sorted by id.
pub fn parse_tiles(text: &str) -> EngineResult<Vec<Tile>> {
    let mut tiles = TilePicker::new().parse(text)?;
    tiles.sort();
    Ok(tiles)
}

pub fn parse_tile(text: &str) -> EngineResult<Tile> {
    let tiles = TilePicker::new().parse(text)?;
    match tiles.as_slice() {
        [tile] => Ok(*tile),
        [] => Err(EngineError::Parse {
            input: text.to_string(),
            message: "No tile found in string".to_string(),
        }),
        _ => Err(EngineError::Parse {
            input: text.to_string(),
            message: format!("Expected exactly one tile, found {}", tiles.len()),
        }),
    }
}
