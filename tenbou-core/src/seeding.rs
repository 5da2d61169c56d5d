//! Session-level seeding.
//!
//! A session seed fans out into independent per-game seeds:
//!
//! ```text
//! session seed ─SHA-256(seed || game_index)─▶ game seed (u64)
//! game seed ─SHA-256(seed || round || honba)─▶ round wall   (engine side)
//! ```
//!
//! Given the same session seed, the n-th game always gets the same seed on
//! any platform and any thread count, so batch runs are reproducible no
//! matter how rayon schedules them.

use sha2::{Digest, Sha256};

/// A deterministic counter that hands out per-game seeds.
///
/// # Example
///
/// ```
/// use tenbou_core::seeding::SessionRng;
///
/// let mut session = SessionRng::new([0u8; 32]);
/// let seed_0 = session.next_game_seed();
/// let seed_1 = session.next_game_seed();
/// assert_ne!(seed_0, seed_1);
/// ```
#[derive(Debug, Clone)]
pub struct SessionRng {
    seed: [u8; 32],
    game_index: u64,
}

impl SessionRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            game_index: 0,
        }
    }

    /// Session seed from a plain integer, for tests and command lines.
    pub fn from_u64(seed: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"tenbou-session");
        hasher.update(seed.to_le_bytes());
        Self::new(hasher.finalize().into())
    }

    /// Number of seeds handed out so far.
    pub fn game_index(&self) -> u64 {
        self.game_index
    }

    /// Seed of the game at `index`, without advancing the counter.
    pub fn game_seed_at(&self, index: u64) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(index.to_le_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(head)
    }

    /// Seed for the next game; advances the counter.
    pub fn next_game_seed(&mut self) -> u64 {
        let seed = self.game_seed_at(self.game_index);
        self.game_index += 1;
        seed
    }
}
