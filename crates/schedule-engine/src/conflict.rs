//! Detect overlapping event intervals.
//!
//! Collisions are advisory: the registry reports them but never refuses an
//! event because of one. Adjacent intervals (one ends exactly when another
//! starts) are NOT collisions.

use serde::Serialize;

use crate::interval::Interval;

/// Return the id of every existing interval that overlaps `candidate`, in
/// input order.
///
/// When `own` is given, an entry carrying that id is skipped so an event being
/// edited never collides with its previous self.
pub fn find_overlaps<I, It>(candidate: &Interval, own: Option<I>, existing: It) -> Vec<I>
where
    I: PartialEq + Copy,
    It: IntoIterator<Item = (I, Interval)>,
{
    existing
        .into_iter()
        .filter(|(id, _)| own != Some(*id))
        .filter(|(_, interval)| candidate.overlaps(interval))
        .map(|(id, _)| id)
        .collect()
}

/// A detected collision between two entries of the same list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict<I> {
    pub first: I,
    pub second: I,
    pub overlap_minutes: i64,
}

/// Find all pairwise collisions within one list.
///
/// Pairs are reported once, with `first` preceding `second` in input order.
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts<I: Copy>(entries: &[(I, Interval)]) -> Vec<Conflict<I>> {
    let mut conflicts = Vec::new();

    for (i, (a_id, a)) in entries.iter().enumerate() {
        for (b_id, b) in &entries[i + 1..] {
            if a.overlaps(b) {
                conflicts.push(Conflict {
                    first: *a_id,
                    second: *b_id,
                    overlap_minutes: a.overlap_minutes(b),
                });
            }
        }
    }

    conflicts
}
