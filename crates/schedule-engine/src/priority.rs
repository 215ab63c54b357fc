//! Priority labels, their numeric rank, and the event orderings built on them.
//!
//! Rank is the total order used everywhere: HIGH = 1, MEDIUM = 2, LOW = 3.
//! Lower rank is more urgent. [`rank_label`] tolerates any text and ranks an
//! unrecognized label last ([`UNRANKED`]); the strict parser behind
//! [`Priority::from_str`](std::str::FromStr) is the validator and rejects it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::event::Event;

/// Rank given to labels that are not a known priority.
pub const UNRANKED: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(ScheduleError::InvalidPriority(s.trim().to_string())),
        }
    }
}

/// Rank a free-text priority label. Never fails.
pub fn rank_label(label: &str) -> u8 {
    label.parse::<Priority>().map(Priority::rank).unwrap_or(UNRANKED)
}

/// The event orderings offered for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Rank ascending, then earlier end first.
    #[default]
    Priority,
    /// Start ascending, then lower rank first.
    Start,
    /// End ascending, then lower rank first.
    End,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(SortKey::Priority),
            "start" => Ok(SortKey::Start),
            "end" => Ok(SortKey::End),
            other => Err(format!(
                "unknown sort key '{other}' (expected priority, start or end)"
            )),
        }
    }
}

pub fn cmp_by_priority(a: &Event, b: &Event) -> Ordering {
    a.priority()
        .rank()
        .cmp(&b.priority().rank())
        .then_with(|| a.interval().end().cmp(&b.interval().end()))
}

pub fn cmp_by_start(a: &Event, b: &Event) -> Ordering {
    a.interval()
        .start()
        .cmp(&b.interval().start())
        .then_with(|| a.priority().rank().cmp(&b.priority().rank()))
}

pub fn cmp_by_end(a: &Event, b: &Event) -> Ordering {
    a.interval()
        .end()
        .cmp(&b.interval().end())
        .then_with(|| a.priority().rank().cmp(&b.priority().rank()))
}

impl SortKey {
    pub fn comparator(self) -> fn(&Event, &Event) -> Ordering {
        match self {
            SortKey::Priority => cmp_by_priority,
            SortKey::Start => cmp_by_start,
            SortKey::End => cmp_by_end,
        }
    }
}

/// Sort events with a stable sort; events equal under `key` keep their
/// relative order. Priority is always read from the event itself.
pub fn sort_events<E: AsRef<Event>>(events: &mut [E], key: SortKey) {
    let cmp = key.comparator();
    events.sort_by(|a, b| cmp(a.as_ref(), b.as_ref()));
}

/// Keep events whose rank lies in `[lower, upper]`, preserving order.
///
/// # Errors
/// Returns `ScheduleError::InvalidRange` when `lower > upper`.
pub fn filter_by_priority_range<'a, I>(lower: u8, upper: u8, events: I) -> Result<Vec<&'a Event>>
where
    I: IntoIterator<Item = &'a Event>,
{
    if lower > upper {
        return Err(ScheduleError::InvalidRange { lower, upper });
    }
    Ok(events
        .into_iter()
        .filter(|e| (lower..=upper).contains(&e.priority().rank()))
        .collect())
}
