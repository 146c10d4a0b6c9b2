//! Layered minimal hitting-set enumeration
//!
//! Given conflicts `C1..Ck`, a set `H` is a hitting set iff it intersects
//! every conflict, and minimal if no proper subset does. Full
//! minimum-cardinality search is NP-hard; this enumerator is the bounded,
//! layered variant:
//!
//! 1. Fix the component universe `U` (union of all conflicts) in id order.
//! 2. For `s = 1..=max_set_size`, enumerate every `s`-subset of `U` in
//!    lexicographic order and keep those hitting all conflicts.
//! 3. Stop at the first size that yields any hit, returning at most `cap`
//!    of them. Every set found at that size is minimal by cardinality.
//!
//! If no size within the bound works, the caller receives the whole
//! universe as a single fallback set with `exhausted` flagged.

use crate::conflict::Conflict;
use std::collections::BTreeSet;

/// Result of one enumeration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    /// Minimal hitting sets in lexicographic order, or the fallback universe
    pub sets: Vec<BTreeSet<String>>,
    /// True when no hitting set existed within the size bound
    pub exhausted: bool,
}

/// Enumerate minimal hitting sets over `conflicts` up to `max_set_size`
///
/// Returns at most `cap` sets. With no conflicts there is nothing to hit
/// and the result is empty.
#[must_use]
pub fn enumerate(conflicts: &[Conflict], max_set_size: usize, cap: usize) -> Enumeration {
    if conflicts.is_empty() || cap == 0 {
        return Enumeration {
            sets: Vec::new(),
            exhausted: false,
        };
    }

    // BTreeSet union keeps the universe in id order, which makes subset
    // enumeration lexicographic by construction.
    let universe: Vec<&String> = conflicts
        .iter()
        .flat_map(|conflict| conflict.components().iter())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    for size in 1..=max_set_size.min(universe.len()) {
        let found = subsets_hitting_all(&universe, size, conflicts, cap);
        if !found.is_empty() {
            return Enumeration {
                sets: found,
                exhausted: false,
            };
        }
    }

    // Trivially valid fallback: the whole universe hits every conflict.
    let fallback = universe.into_iter().cloned().collect();
    Enumeration {
        sets: vec![fallback],
        exhausted: true,
    }
}

/// Collect `size`-subsets of `universe` hitting every conflict, up to `cap`
fn subsets_hitting_all(
    universe: &[&String],
    size: usize,
    conflicts: &[Conflict],
    cap: usize,
) -> Vec<BTreeSet<String>> {
    let mut found = Vec::new();
    let mut indices: Vec<usize> = (0..size).collect();

    loop {
        let candidate: BTreeSet<String> = indices
            .iter()
            .map(|&position| universe[position].clone())
            .collect();
        if hits_all(&candidate, conflicts) {
            found.push(candidate);
            if found.len() >= cap {
                return found;
            }
        }
        if !next_combination(&mut indices, universe.len()) {
            return found;
        }
    }
}

fn hits_all(candidate: &BTreeSet<String>, conflicts: &[Conflict]) -> bool {
    conflicts.iter().all(|conflict| conflict.hit_by(candidate))
}

/// Advance `indices` to the next combination in lexicographic order
///
/// Returns false once the last combination has been visited.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let size = indices.len();
    let mut slot = size;
    while slot > 0 {
        slot -= 1;
        if indices[slot] < n - (size - slot) {
            indices[slot] += 1;
            for follow in slot + 1..size {
                indices[follow] = indices[follow - 1] + 1;
            }
            return true;
        }
    }
    false
}
