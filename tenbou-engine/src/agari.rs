//! Winning-shape matcher over kind histograms.
//!
//! All functions take the concealed part of a hand only: with `m` melds a
//! complete hand holds `14 - 3m` concealed tiles and a waiting one `13 - 3m`.

use crate::tile::{HONOR_START, NUM_KINDS, TERMINAL_HONOR_KINDS};

pub type Counts = [u8; NUM_KINDS];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mentsu {
    Koutsu(u8),
    Shuntsu(u8),
}

#[derive(Debug, Clone)]
pub struct Division {
    pub head: u8,
    pub body: Vec<Mentsu>,
}

fn total(counts: &Counts) -> u32 {
    counts.iter().map(|&c| c as u32).sum()
}

pub fn is_agari(counts: &Counts) -> bool {
    if total(counts) % 3 != 2 {
        return false;
    }
    is_kokushi(counts) || is_chiitoitsu(counts) || is_standard_agari(counts)
}

/// Kinds that would complete the hand. Kinds already held four times are
/// skipped.
pub fn waits(counts: &Counts) -> Vec<u8> {
    if total(counts) % 3 != 1 {
        return Vec::new();
    }
    let mut work = *counts;
    let mut result = Vec::new();
    for kind in 0..NUM_KINDS {
        if work[kind] >= 4 {
            continue;
        }
        work[kind] += 1;
        if is_agari(&work) {
            result.push(kind as u8);
        }
        work[kind] -= 1;
    }
    result
}

pub fn is_tenpai(counts: &Counts) -> bool {
    if total(counts) % 3 != 1 {
        return false;
    }
    let mut work = *counts;
    for kind in 0..NUM_KINDS {
        if work[kind] >= 4 {
            continue;
        }
        work[kind] += 1;
        let done = is_agari(&work);
        work[kind] -= 1;
        if done {
            return true;
        }
    }
    false
}

pub fn is_kokushi(counts: &Counts) -> bool {
    if total(counts) != 14 {
        return false;
    }
    let mut pair_found = false;
    for &kind in &TERMINAL_HONOR_KINDS {
        match counts[kind as usize] {
            0 => return false,
            1 => {}
            2 if !pair_found => pair_found = true,
            _ => return false,
        }
    }
    pair_found
}

/// Seven distinct pairs. Four of a kind never counts as two pairs.
pub fn is_chiitoitsu(counts: &Counts) -> bool {
    let mut pairs = 0;
    for &c in counts.iter() {
        match c {
            0 => {}
            2 => pairs += 1,
            _ => return false,
        }
    }
    pairs == 7
}

pub fn is_standard_agari(counts: &Counts) -> bool {
    let mut work = *counts;
    for kind in 0..NUM_KINDS {
        if work[kind] >= 2 {
            work[kind] -= 2;
            let ok = decompose(&mut work, 0);
            work[kind] += 2;
            if ok {
                return true;
            }
        }
    }
    false
}

fn is_sequence_start(kind: usize) -> bool {
    kind < HONOR_START as usize && kind % 9 <= 6
}

fn decompose(counts: &mut Counts, start: usize) -> bool {
    let mut i = start;
    while i < NUM_KINDS && counts[i] == 0 {
        i += 1;
    }
    if i == NUM_KINDS {
        return true;
    }
    if counts[i] >= 3 {
        counts[i] -= 3;
        let ok = decompose(counts, i);
        counts[i] += 3;
        if ok {
            return true;
        }
    }
    if is_sequence_start(i) && counts[i + 1] > 0 && counts[i + 2] > 0 {
        counts[i] -= 1;
        counts[i + 1] -= 1;
        counts[i + 2] -= 1;
        let ok = decompose(counts, i);
        counts[i] += 1;
        counts[i + 1] += 1;
        counts[i + 2] += 1;
        if ok {
            return true;
        }
    }
    false
}

/// Every pair-plus-sets reading of a complete concealed part.
pub fn find_divisions(counts: &Counts) -> Vec<Division> {
    let mut divisions = Vec::new();
    for head in 0..NUM_KINDS {
        if counts[head] < 2 {
            continue;
        }
        let mut work = *counts;
        work[head] -= 2;
        let mut bodies = Vec::new();
        decompose_all(&mut work, 0, &mut Vec::new(), &mut bodies);
        for body in bodies {
            divisions.push(Division {
                head: head as u8,
                body,
            });
        }
    }
    divisions
}

fn decompose_all(
    counts: &mut Counts,
    start: usize,
    current: &mut Vec<Mentsu>,
    results: &mut Vec<Vec<Mentsu>>,
) {
    let mut i = start;
    while i < NUM_KINDS && counts[i] == 0 {
        i += 1;
    }
    if i == NUM_KINDS {
        results.push(current.clone());
        return;
    }
    if counts[i] >= 3 {
        counts[i] -= 3;
        current.push(Mentsu::Koutsu(i as u8));
        decompose_all(counts, i, current, results);
        current.pop();
        counts[i] += 3;
    }
    if is_sequence_start(i) && counts[i + 1] > 0 && counts[i + 2] > 0 {
        counts[i] -= 1;
        counts[i + 1] -= 1;
        counts[i + 2] -= 1;
        current.push(Mentsu::Shuntsu(i as u8));
        decompose_all(counts, i, current, results);
        current.pop();
        counts[i] += 1;
        counts[i + 1] += 1;
        counts[i + 2] += 1;
    }
}
