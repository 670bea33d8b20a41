//! Locating the Übersquadrat in a visited set.

use crate::models::{BaseRegion, SquareKey, VisitedSet};
use std::collections::HashMap;
use tracing::{debug, info};

/// Largest axis-aligned square of visited squares.
///
/// Maximal-square dynamic programming over the visited keys in row-major
/// order: each key stores the side of the largest all-visited square ending
/// at it. Only visited keys are stored, so sparse sets spread over a large
/// area stay cheap. On equal sides the square reached first in row-major
/// order wins. Returns `None` for an empty set.
pub fn find_ubersquadrat(visited: &VisitedSet) -> Option<BaseRegion> {
    let mut keys: Vec<SquareKey> = visited.iter().copied().collect();
    keys.sort_unstable();

    let mut sides: HashMap<SquareKey, i32> = HashMap::with_capacity(keys.len());
    let mut best: Option<(SquareKey, i32)> = None;

    for key in keys {
        // Nothing lies below i32::MIN, so a missing row or column counts as side 0
        let side_at = |i: Option<i32>, j: Option<i32>| {
            i.zip(j)
                .and_then(|(i, j)| sides.get(&SquareKey::new(i, j)).copied())
                .unwrap_or(0)
        };
        let (below, left) = (key.i.checked_sub(1), key.j.checked_sub(1));
        let side = 1 + side_at(below, Some(key.j))
            .min(side_at(Some(key.i), left))
            .min(side_at(below, left));
        sides.insert(key, side);
        if best.is_none_or(|(_, best_side)| side > best_side) {
            best = Some((key, side));
        }
    }

    let (corner, side) = match best {
        Some(found) => found,
        None => {
            debug!("no visited squares, no Übersquadrat");
            return None;
        }
    };

    let region = BaseRegion {
        min_i: corner.i - (side - 1),
        max_i: corner.i,
        min_j: corner.j - (side - 1),
        max_j: corner.j,
    };
    info!(
        side,
        min_i = region.min_i,
        max_i = region.max_i,
        min_j = region.min_j,
        max_j = region.max_j,
        visited = visited.len(),
        "detected Übersquadrat"
    );
    Some(region)
}
