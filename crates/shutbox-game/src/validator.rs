//! Move validation: subset-sum feasibility over a player's open tiles.
//!
//! These are pure functions with no access to session state, so they can
//! be tested and reused directly (hints, bots, strict pass checks).
//!
//! The search is plain depth-first backtracking: each tile is either
//! taken or skipped, and a branch is cut as soon as a tile exceeds the
//! remaining target. With at most twelve tiles the worst case is 4096
//! leaves.

use std::collections::BTreeSet;

use crate::GameError;

/// Sum of a set of tiles, as used for round scores.
pub fn tile_sum(tiles: &BTreeSet<u8>) -> u32 {
    tiles.iter().map(|&t| u32::from(t)).sum()
}

/// Returns `true` if some subset of `tiles` sums exactly to `target`.
///
/// A target of 0 is always feasible: the empty subset sums to it, even
/// when `tiles` itself is empty.
pub fn feasible(tiles: &BTreeSet<u8>, target: u32) -> bool {
    find_move(tiles, target).is_some()
}

/// Finds a subset of `tiles` summing to `target`, preferring high tiles.
///
/// The returned values are in descending order. `None` means no subset
/// exists.
pub fn find_move(tiles: &BTreeSet<u8>, target: u32) -> Option<Vec<u8>> {
    let values: Vec<u8> = tiles.iter().rev().copied().collect();
    let mut chosen = Vec::with_capacity(values.len());
    search(&values, target, &mut chosen).then_some(chosen)
}

fn search(values: &[u8], remaining: u32, chosen: &mut Vec<u8>) -> bool {
    if remaining == 0 {
        return true;
    }
    let Some((&first, rest)) = values.split_first() else {
        return false;
    };

    let value = u32::from(first);
    if value <= remaining {
        chosen.push(first);
        if search(rest, remaining - value, chosen) {
            return true;
        }
        chosen.pop();
    }
    search(rest, remaining, chosen)
}

/// Checks a claimed move: every proposed value is currently held, no
/// value is claimed twice, and the values sum exactly to `target`.
///
/// This is a direct membership and sum check. It never searches.
pub fn validate(tiles: &BTreeSet<u8>, proposed: &[u8], target: u32) -> bool {
    let mut seen = BTreeSet::new();
    for value in proposed {
        if !tiles.contains(value) || !seen.insert(*value) {
            return false;
        }
    }
    proposed.iter().map(|&t| u32::from(t)).sum::<u32>() == target
}

/// Rejects selections that could never be a move in a session with
/// `max_tiles` tiles, independent of what the player currently holds.
pub(crate) fn check_selection(proposed: &[u8], max_tiles: u8) -> Result<(), GameError> {
    if proposed.is_empty() {
        return Err(GameError::MalformedSelection("no tiles selected".into()));
    }
    let mut seen = BTreeSet::new();
    for &value in proposed {
        if value == 0 || value > max_tiles {
            return Err(GameError::MalformedSelection(format!(
                "tile {value} is outside 1-{max_tiles}"
            )));
        }
        if !seen.insert(value) {
            return Err(GameError::MalformedSelection(format!(
                "tile {value} selected more than once"
            )));
        }
    }
    Ok(())
}
