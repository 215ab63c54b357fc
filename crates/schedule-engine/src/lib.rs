//! # schedule-engine
//!
//! Event scheduling with interval collision detection and per-participant
//! availability ledgers.
//!
//! The engine keeps every view it offers (collision warnings, filtered lists,
//! sorted lists, free time) consistent with two questions: does interval A
//! overlap interval B, and is participant P free during `[s, e)`. Mutations
//! that cannot be applied to every affected ledger are rolled back and
//! reported as typed errors. The engine never logs or prints.
//!
//! ## Modules
//!
//! - [`interval`] — half-open `[start, end)` intervals and the timestamp format
//! - [`conflict`] — overlap detection between event intervals
//! - [`ledger`] — a participant's free intervals, consumed and restored by assignments
//! - [`priority`] — priority ranks, event orderings, and range filtering
//! - [`event`] — events, participants, drafts
//! - [`registry`] — the orchestrator that owns events and participants
//! - [`freebusy`] / [`availability`] — free-time views over one or many ledgers
//! - [`codec`] — the line-oriented persistence format
//! - [`error`] — Error types

pub mod availability;
pub mod codec;
pub mod conflict;
pub mod error;
pub mod event;
pub mod freebusy;
pub mod interval;
pub mod ledger;
pub mod priority;
pub mod registry;

pub use conflict::{find_conflicts, find_overlaps, Conflict};
pub use error::{Result, ScheduleError};
pub use event::{
    AccessLevel, Event, EventChanges, EventDraft, EventId, Participant, ParticipantId,
};
pub use freebusy::{find_first_free_slot, free_slots, FreeSlot};
pub use interval::{format_timestamp, parse_timestamp, Interval, Timestamp};
pub use ledger::{AvailabilityLedger, ReleasePolicy};
pub use priority::{filter_by_priority_range, rank_label, sort_events, Priority, SortKey};
pub use registry::{Collision, EventRegistry};
