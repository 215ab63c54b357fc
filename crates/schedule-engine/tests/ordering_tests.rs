//! Tests for priority orderings and range filtering.

use chrono::NaiveDate;
use schedule_engine::{
    filter_by_priority_range, rank_label, EventDraft, EventRegistry, Priority, ScheduleError,
    SortKey, Timestamp,
};

fn at(hour: u32, min: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn add(reg: &mut EventRegistry, name: &str, start: u32, end: u32, priority: Priority) {
    reg.add_event(EventDraft {
        name: name.to_string(),
        start: at(start, 0),
        end: at(end, 0),
        location: String::new(),
        description: String::new(),
        priority,
    })
    .unwrap();
}

fn names<'a>(events: impl IntoIterator<Item = &'a schedule_engine::Event>) -> Vec<&'a str> {
    events.into_iter().map(|e| e.name()).collect()
}

/// LOW ending 12:00, HIGH ending 13:00, MEDIUM ending 11:00.
fn mixed() -> EventRegistry {
    let mut reg = EventRegistry::new();
    add(&mut reg, "low", 11, 12, Priority::Low);
    add(&mut reg, "high", 9, 13, Priority::High);
    add(&mut reg, "medium", 10, 11, Priority::Medium);
    reg
}

#[test]
fn rank_values() {
    assert_eq!(Priority::High.rank(), 1);
    assert_eq!(Priority::Medium.rank(), 2);
    assert_eq!(Priority::Low.rank(), 3);
    assert_eq!(rank_label("whenever"), 4);
}

#[test]
fn by_priority_puts_high_first() {
    let reg = mixed();
    assert_eq!(names(reg.sorted(SortKey::Priority)), ["high", "medium", "low"]);
}

#[test]
fn by_end_time_orders_ends() {
    let reg = mixed();
    assert_eq!(names(reg.sorted(SortKey::End)), ["medium", "low", "high"]);
}

#[test]
fn by_start_time_orders_starts() {
    let reg = mixed();
    assert_eq!(names(reg.sorted(SortKey::Start)), ["high", "medium", "low"]);
}

#[test]
fn priority_ties_break_on_earlier_end() {
    let mut reg = EventRegistry::new();
    add(&mut reg, "late", 9, 15, Priority::High);
    add(&mut reg, "early", 9, 10, Priority::High);
    assert_eq!(names(reg.sorted(SortKey::Priority)), ["early", "late"]);
}

#[test]
fn time_ties_break_on_priority() {
    let mut reg = EventRegistry::new();
    add(&mut reg, "low", 9, 10, Priority::Low);
    add(&mut reg, "high", 9, 10, Priority::High);
    assert_eq!(names(reg.sorted(SortKey::Start)), ["high", "low"]);
    assert_eq!(names(reg.sorted(SortKey::End)), ["high", "low"]);
}

#[test]
fn full_ties_keep_insertion_order() {
    let mut reg = EventRegistry::new();
    add(&mut reg, "first", 9, 10, Priority::Medium);
    add(&mut reg, "second", 9, 10, Priority::Medium);
    add(&mut reg, "third", 9, 10, Priority::Medium);
    for key in [SortKey::Priority, SortKey::Start, SortKey::End] {
        assert_eq!(names(reg.sorted(key)), ["first", "second", "third"]);
    }
}

#[test]
fn sorting_in_place_renumbers_and_keeps_priorities() {
    let mut reg = mixed();
    reg.sort_events(SortKey::Priority);

    let priorities: Vec<Priority> = reg.events().iter().map(|e| e.priority()).collect();
    assert_eq!(priorities, [Priority::High, Priority::Medium, Priority::Low]);
    assert_eq!(reg.event(0).unwrap().name(), "high");
    assert_eq!(reg.position_of(reg.event(2).unwrap().id()), Some(2));
}

#[test]
fn filter_is_inclusive_and_order_preserving() {
    let reg = mixed();
    let kept = reg.filter_by_priority_range(1, 2).unwrap();
    assert_eq!(names(kept), ["high", "medium"]);
}

#[test]
fn filter_single_rank() {
    let reg = mixed();
    assert_eq!(names(reg.filter_by_priority_range(3, 3).unwrap()), ["low"]);
}

#[test]
fn filter_inverted_range_fails() {
    let reg = mixed();
    assert_eq!(
        reg.filter_by_priority_range(2, 1).unwrap_err(),
        ScheduleError::InvalidRange { lower: 2, upper: 1 }
    );
}

#[test]
fn free_function_filter_on_views() {
    let reg = mixed();
    let sorted = reg.sorted(SortKey::End);
    let kept = filter_by_priority_range(2, 4, sorted).unwrap();
    assert_eq!(names(kept), ["medium", "low"]);
}
