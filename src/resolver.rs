// Source/target -> cardinal direction

use crate::types::{Coord, Direction};

/// Stand-in for an axis offset of zero: moving that way makes no progress
const ALIGNED: usize = usize::MAX;

/// Picks the cardinal direction that closes the gap from `source` to `target` fastest.
///
/// Each direction is scored by the wrapped distance still to travel along it, and an
/// already-aligned axis never wins. Ties go to the first of North, East, South, West.
/// When `source == target` every axis is aligned and the result degenerates to North,
/// so callers should not ask for that.
pub fn resolve(source: Coord, target: Coord, width: usize, height: usize) -> Direction {
    let gaps = [
        (source.y + height - target.y) % height,
        (target.x + width - source.x) % width,
        (target.y + height - source.y) % height,
        (source.x + width - target.x) % width,
    ];

    let mut best = 0;
    let mut best_gap = ALIGNED;
    for (i, &gap) in gaps.iter().enumerate() {
        let gap = if gap == 0 { ALIGNED } else { gap };
        if gap < best_gap {
            best = i;
            best_gap = gap;
        }
    }

    Direction::cardinals()[best]
}
