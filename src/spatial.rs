//! Stateless proximity queries over a category bucket.
//!
//! Distance is Chebyshev (`max(|dx|, |dy|)`), the cost of grid-step
//! movement.  Floors are ignored by the distance itself; callers that care
//! filter with [`on_floor`] or pass an origin whose floor matches.  Entries
//! with no known position never match.

use crate::entry::Entry;
use crate::types::Position;

/// Closest entry within `max_range` (inclusive), with its distance.
///
/// Ties go to whichever entry comes first in `entries`; the bucket order
/// carries no meaning beyond being stable between rebuilds.
pub fn nearest<'a>(
    entries: &[&'a Entry],
    origin: &Position,
    max_range: u32,
) -> Option<(&'a Entry, u32)> {
    let mut best: Option<(&'a Entry, u32)> = None;
    for entry in entries {
        let Some(pos) = entry.position else {
            continue;
        };
        let distance = origin.chebyshev(&pos);
        if distance > max_range {
            continue;
        }
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((*entry, distance));
        }
    }
    best
}

/// Every entry within `range` (inclusive), in bucket order.
pub fn in_range<'a>(entries: &[&'a Entry], origin: &Position, range: u32) -> Vec<&'a Entry> {
    entries
        .iter()
        .copied()
        .filter(|entry| {
            entry
                .position
                .is_some_and(|pos| origin.chebyshev(&pos) <= range)
        })
        .collect()
}

/// Every entry on floor `z`, in bucket order.
pub fn on_floor<'a>(entries: &[&'a Entry], z: u8) -> Vec<&'a Entry> {
    entries
        .iter()
        .copied()
        .filter(|entry| entry.position.is_some_and(|pos| pos.z == z))
        .collect()
}
