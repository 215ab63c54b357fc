//! Shared availability across several participants.
//!
//! Intersects the ledgers of N participants inside a window. Every resulting
//! slot lies inside one free block of every participant, so an event placed
//! within it can be assigned to all of them.

use crate::freebusy::{clip_sorted, FreeSlot};
use crate::interval::Interval;
use crate::ledger::AvailabilityLedger;

/// Time inside `window` during which every ledger is free, sorted by start.
///
/// With no ledgers the whole window is free.
pub fn common_free_slots(ledgers: &[&AvailabilityLedger], window: &Interval) -> Vec<FreeSlot> {
    let mut common = vec![*window];

    for ledger in ledgers {
        let blocks = clip_sorted(ledger.slots(), window);
        common = common
            .iter()
            .flat_map(|c| blocks.iter().filter_map(move |b| c.intersection(b)))
            .collect();
        common.sort();
        common.dedup();
        if common.is_empty() {
            break;
        }
    }

    common.into_iter().map(FreeSlot::from).collect()
}

/// The first shared slot of at least `min_duration_minutes`.
pub fn find_first_common_slot(
    ledgers: &[&AvailabilityLedger],
    window: &Interval,
    min_duration_minutes: i64,
) -> Option<FreeSlot> {
    common_free_slots(ledgers, window)
        .into_iter()
        .find(|slot| slot.duration_minutes >= min_duration_minutes)
}
