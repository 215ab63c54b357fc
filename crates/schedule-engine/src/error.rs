//! Error types for schedule-engine operations.

use thiserror::Error;

use crate::interval::{Interval, Timestamp};

/// Errors returned by the scheduling engine.
///
/// Every variant carries enough data (index, participant name, interval) for a
/// caller to render a message without consulting engine state again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: Timestamp, end: Timestamp },

    #[error("Invalid index {index}: registry holds {len} item(s)")]
    InvalidIndex { index: usize, len: usize },

    #[error("Invalid time order: proposed end {end} is not after start {start}")]
    InvalidTimeOrder { start: Timestamp, end: Timestamp },

    /// The ledger has no single free block covering the span.
    #[error("No free slot covers {0}")]
    Unavailable(Interval),

    #[error("Participant '{name}' is not available during {interval}")]
    ParticipantUnavailable { name: String, interval: Interval },

    #[error("Participant '{participant}' is already assigned to event '{event}'")]
    DuplicateAssignment { participant: String, event: String },

    #[error("Participant '{participant}' is not assigned to event '{event}'")]
    NotAssigned { participant: String, event: String },

    #[error("Invalid priority range: lower bound {lower} is greater than upper bound {upper}")]
    InvalidRange { lower: u8, upper: u8 },

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Participant already exists: {0}")]
    DuplicateParticipant(String),

    #[error("Participant name must not be empty")]
    EmptyParticipantName,

    #[error("Invalid priority label: {0}")]
    InvalidPriority(String),

    #[error("Invalid access level: {0}")]
    InvalidAccessLevel(String),

    #[error("Invalid timestamp '{0}': expected YYYY-MM-DD HH:MM")]
    InvalidTimestamp(String),

    /// A value cannot be written in the line format.
    #[error("Encoding error: {0}")]
    Encode(String),

    /// A persisted line could not be decoded (1-based line number).
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Convenience alias used throughout schedule-engine.
pub type Result<T> = std::result::Result<T, ScheduleError>;
