//! Free-time views over a single availability ledger.
//!
//! Ledger blocks are clipped to a window and sorted by start. They are NOT
//! merged: each reported slot is one ledger block, so any span inside a
//! reported slot can actually be assigned.

use serde::Serialize;

use crate::interval::{Interval, Timestamp};
use crate::ledger::AvailabilityLedger;

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeSlot {
    pub start: Timestamp,
    pub end: Timestamp,
    pub duration_minutes: i64,
}

impl From<Interval> for FreeSlot {
    fn from(interval: Interval) -> Self {
        Self {
            start: interval.start(),
            end: interval.end(),
            duration_minutes: interval.duration_minutes(),
        }
    }
}

/// Clip intervals to `window`, dropping those entirely outside, and sort them
/// by (start, end).
pub(crate) fn clip_sorted(slots: &[Interval], window: &Interval) -> Vec<Interval> {
    let mut clipped: Vec<Interval> = slots
        .iter()
        .filter_map(|slot| slot.intersection(window))
        .collect();
    clipped.sort();
    clipped.dedup();
    clipped
}

/// Free slots of one ledger within `window`, sorted by start time.
pub fn free_slots(ledger: &AvailabilityLedger, window: &Interval) -> Vec<FreeSlot> {
    clip_sorted(ledger.slots(), window)
        .into_iter()
        .map(FreeSlot::from)
        .collect()
}

/// The first free slot of at least `min_duration_minutes` within the window.
pub fn find_first_free_slot(
    ledger: &AvailabilityLedger,
    window: &Interval,
    min_duration_minutes: i64,
) -> Option<FreeSlot> {
    free_slots(ledger, window)
        .into_iter()
        .find(|slot| slot.duration_minutes >= min_duration_minutes)
}
