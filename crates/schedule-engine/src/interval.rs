//! Half-open time intervals and the shared timestamp format.
//!
//! An [`Interval`] is `[start, end)`: the start minute is included, the end
//! minute is not. Two intervals that merely touch (`a.end == b.start`) do not
//! overlap, which lets back-to-back events coexist without a collision.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// A naive local timestamp with minute resolution.
pub type Timestamp = NaiveDateTime;

/// Text form used by the codec and the CLI.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a `YYYY-MM-DD HH:MM` timestamp.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimestamp` if the text does not match the format.
pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| ScheduleError::InvalidTimestamp(text.trim().to_string()))
}

/// Format a timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// A half-open time range `[start, end)` with `start < end`.
///
/// Construction is the only place the invariant is checked; every other
/// operation can rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: Timestamp,
    end: Timestamp,
}

#[derive(Deserialize)]
struct RawInterval {
    start: Timestamp,
    end: Timestamp,
}

impl TryFrom<RawInterval> for Interval {
    type Error = ScheduleError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Create a new interval.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidInterval` when `start >= end`. Zero-length
    /// intervals are rejected.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start >= end {
            return Err(ScheduleError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse both endpoints from `YYYY-MM-DD HH:MM` text.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Inclusive start.
    #[inline]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Exclusive end.
    #[inline]
    pub fn end(&self) -> Timestamp {
        self.end
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Returns `true` if the two intervals share at least one instant.
    ///
    /// Touching endpoints do not count: `[10:00, 11:00)` and `[11:00, 12:00)`
    /// are disjoint.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    /// Returns `true` if `other` lies entirely within `self`.
    #[inline]
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the intervals overlap or share an endpoint.
    #[inline]
    pub fn touches_or_overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The common part of two intervals, if any.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Interval { start, end })
    }

    /// Overlap length in minutes, zero when disjoint.
    pub fn overlap_minutes(&self, other: &Interval) -> i64 {
        self.intersection(other)
            .map(|i| i.duration_minutes())
            .unwrap_or(0)
    }

    /// The smallest interval covering both. Only meaningful when they touch
    /// or overlap.
    pub(crate) fn span(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The parts of `self` left over after removing `inner`, which must be
    /// contained in `self`. Empty remainders are dropped.
    pub(crate) fn split_around(&self, inner: &Interval) -> (Option<Interval>, Option<Interval>) {
        debug_assert!(self.contains(inner));
        let before = (self.start < inner.start).then_some(Interval {
            start: self.start,
            end: inner.start,
        });
        let after = (inner.end < self.end).then_some(Interval {
            start: inner.end,
            end: self.end,
        });
        (before, after)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: &str, end: &str) -> Interval {
        Interval::parse(start, end).unwrap()
    }

    #[test]
    fn zero_length_interval_rejected() {
        let t = parse_timestamp("2026-03-01 10:00").unwrap();
        assert_eq!(
            Interval::new(t, t),
            Err(ScheduleError::InvalidInterval { start: t, end: t })
        );
    }

    #[test]
    fn reversed_interval_rejected() {
        assert!(Interval::parse("2026-03-01 11:00", "2026-03-01 10:00").is_err());
    }

    #[test]
    fn split_around_drops_empty_sides() {
        let slot = iv("2026-03-01 09:00", "2026-03-01 17:00");
        let (before, after) = slot.split_around(&iv("2026-03-01 09:00", "2026-03-01 10:00"));
        assert_eq!(before, None);
        assert_eq!(after, Some(iv("2026-03-01 10:00", "2026-03-01 17:00")));
    }

    #[test]
    fn display_is_half_open() {
        let i = iv("2026-03-01 09:00", "2026-03-01 10:30");
        assert_eq!(i.to_string(), "[2026-03-01 09:00, 2026-03-01 10:30)");
    }

    #[test]
    fn malformed_timestamp_rejected() {
        assert_eq!(
            parse_timestamp("2026-03-01T09:00"),
            Err(ScheduleError::InvalidTimestamp("2026-03-01T09:00".to_string()))
        );
    }

    #[test]
    fn deserialize_enforces_order() {
        let bad = r#"{"start":"2026-03-01T10:00:00","end":"2026-03-01T09:00:00"}"#;
        assert!(serde_json::from_str::<Interval>(bad).is_err());
    }
}
