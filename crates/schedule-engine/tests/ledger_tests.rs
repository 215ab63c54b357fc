//! Tests for availability ledgers and the free-time views built on them.

use chrono::NaiveDate;
use schedule_engine::availability::{common_free_slots, find_first_common_slot};
use schedule_engine::{
    find_first_free_slot, free_slots, AvailabilityLedger, Interval, ReleasePolicy, ScheduleError,
    Timestamp,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, min: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn iv(start: (u32, u32), end: (u32, u32)) -> Interval {
    Interval::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
}

fn workday() -> AvailabilityLedger {
    AvailabilityLedger::new([iv((9, 0), (17, 0))])
}

// ── Containment ─────────────────────────────────────────────────────────────

#[test]
fn free_block_covers_inner_span() {
    assert!(workday().is_free_during(&iv((10, 0), (11, 0))));
}

#[test]
fn overlap_without_containment_is_not_free() {
    let ledger = AvailabilityLedger::new([iv((9, 0), (11, 0))]);
    assert!(!ledger.is_free_during(&iv((10, 30), (12, 0))));
}

#[test]
fn span_split_across_adjacent_blocks_is_not_free() {
    let ledger = AvailabilityLedger::new([iv((9, 0), (10, 0)), iv((10, 0), (11, 0))]);
    assert!(!ledger.is_free_during(&iv((9, 30), (10, 30))));
}

#[test]
fn overlapping_input_slots_are_kept_as_given() {
    let ledger = AvailabilityLedger::new([iv((9, 0), (12, 0)), iv((11, 0), (14, 0))]);
    assert_eq!(ledger.len(), 2);
}

// ── Assign / unassign ───────────────────────────────────────────────────────

#[test]
fn assign_splits_block_into_remainders() {
    let mut ledger = workday();
    ledger.assign(&iv((10, 0), (11, 0))).unwrap();
    assert_eq!(ledger.slots(), &[iv((9, 0), (10, 0)), iv((11, 0), (17, 0))]);
}

#[test]
fn append_release_does_not_merge() {
    let mut ledger = workday();
    ledger.assign(&iv((10, 0), (11, 0))).unwrap();
    ledger.unassign(&iv((10, 0), (11, 0)), ReleasePolicy::Append);

    assert_eq!(
        ledger.slots(),
        &[
            iv((9, 0), (10, 0)),
            iv((11, 0), (17, 0)),
            iv((10, 0), (11, 0)),
        ]
    );
    // The day is free again but no single block covers 09:30-11:30.
    assert!(!ledger.is_free_during(&iv((9, 30), (11, 30))));
}

#[test]
fn coalesce_release_restores_single_block() {
    let mut ledger = workday();
    ledger.assign(&iv((10, 0), (11, 0))).unwrap();
    ledger.unassign(&iv((10, 0), (11, 0)), ReleasePolicy::Coalesce);

    assert_eq!(ledger, workday());
    assert!(ledger.is_free_during(&iv((9, 30), (11, 30))));
}

#[test]
fn failed_assign_leaves_ledger_unchanged() {
    let mut ledger = AvailabilityLedger::new([iv((9, 0), (10, 0)), iv((13, 0), (15, 0))]);
    let before = ledger.clone();

    let err = ledger.assign(&iv((9, 30), (13, 30))).unwrap_err();

    assert_eq!(err, ScheduleError::Unavailable(iv((9, 30), (13, 30))));
    assert_eq!(ledger, before);
}

#[test]
fn assign_uses_first_containing_block() {
    let mut ledger = AvailabilityLedger::new([iv((8, 0), (9, 0)), iv((9, 0), (12, 0)), iv((10, 0), (11, 0))]);
    ledger.assign(&iv((10, 0), (11, 0))).unwrap();
    assert_eq!(
        ledger.slots(),
        &[
            iv((8, 0), (9, 0)),
            iv((9, 0), (10, 0)),
            iv((11, 0), (12, 0)),
            iv((10, 0), (11, 0)),
        ]
    );
}

// ── Free-time views ─────────────────────────────────────────────────────────

#[test]
fn free_slots_clipped_and_sorted() {
    let ledger = AvailabilityLedger::new([iv((14, 0), (18, 0)), iv((7, 0), (10, 0))]);
    let window = iv((8, 0), (17, 0));

    let slots = free_slots(&ledger, &window);

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].start, at(8, 0));
    assert_eq!(slots[0].end, at(10, 0));
    assert_eq!(slots[0].duration_minutes, 120);
    assert_eq!(slots[1].start, at(14, 0));
    assert_eq!(slots[1].end, at(17, 0));
}

#[test]
fn first_free_slot_respects_minimum() {
    let ledger = AvailabilityLedger::new([iv((9, 0), (9, 30)), iv((11, 0), (13, 0))]);
    let window = iv((8, 0), (17, 0));

    let slot = find_first_free_slot(&ledger, &window, 60).unwrap();
    assert_eq!(slot.start, at(11, 0));

    assert!(find_first_free_slot(&ledger, &window, 180).is_none());
}

#[test]
fn common_free_time_intersects_ledgers() {
    let alice = AvailabilityLedger::new([iv((9, 0), (12, 0)), iv((14, 0), (17, 0))]);
    let bob = AvailabilityLedger::new([iv((10, 0), (15, 0))]);
    let window = iv((8, 0), (18, 0));

    let common = common_free_slots(&[&alice, &bob], &window);

    assert_eq!(common.len(), 2);
    assert_eq!((common[0].start, common[0].end), (at(10, 0), at(12, 0)));
    assert_eq!((common[1].start, common[1].end), (at(14, 0), at(15, 0)));
}

#[test]
fn common_free_time_of_nobody_is_whole_window() {
    let window = iv((8, 0), (18, 0));
    let common = common_free_slots(&[], &window);
    assert_eq!(common.len(), 1);
    assert_eq!(common[0].duration_minutes, 600);
}

#[test]
fn first_common_slot_none_when_disjoint() {
    let alice = AvailabilityLedger::new([iv((9, 0), (10, 0))]);
    let bob = AvailabilityLedger::new([iv((10, 0), (11, 0))]);
    let window = iv((8, 0), (18, 0));

    assert!(find_first_common_slot(&[&alice, &bob], &window, 15).is_none());
}
