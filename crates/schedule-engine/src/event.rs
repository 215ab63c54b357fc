//! Events, participants, and the drafts used to create and edit them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::interval::{Interval, Timestamp};
use crate::ledger::AvailabilityLedger;
use crate::priority::Priority;

/// Stable identifier of an event, never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a participant owned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    Admin,
    Member,
}

impl AccessLevel {
    pub fn label(self) -> &'static str {
        match self {
            AccessLevel::Admin => "ADMIN",
            AccessLevel::Member => "MEMBER",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccessLevel {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(AccessLevel::Admin),
            "MEMBER" => Ok(AccessLevel::Member),
            _ => Err(ScheduleError::InvalidAccessLevel(s.trim().to_string())),
        }
    }
}

/// A named person with an access level and a ledger of free time.
///
/// Names compare case-insensitively; see [`Participant::same_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    name: String,
    access: AccessLevel,
    availability: AvailabilityLedger,
}

impl Participant {
    pub fn new(name: impl Into<String>, access: AccessLevel, availability: AvailabilityLedger) -> Self {
        Self {
            name: name.into(),
            access,
            availability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self) -> AccessLevel {
        self.access
    }

    pub fn availability(&self) -> &AvailabilityLedger {
        &self.availability
    }

    pub(crate) fn availability_mut(&mut self) -> &mut AvailabilityLedger {
        &mut self.availability
    }

    pub fn same_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Caller-supplied fields for a new event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub location: String,
    pub description: String,
    pub priority: Priority,
}

/// Fields to change on an existing event. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub name: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

impl EventChanges {
    pub fn touches_time(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == EventChanges::default()
    }
}

/// A scheduled event. Owned by the registry; participants are held by handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: EventId,
    name: String,
    interval: Interval,
    location: String,
    description: String,
    priority: Priority,
    participants: Vec<ParticipantId>,
}

impl Event {
    pub(crate) fn from_draft(id: EventId, interval: Interval, draft: EventDraft) -> Self {
        Self {
            id,
            name: draft.name,
            interval,
            location: draft.location,
            description: draft.description,
            priority: draft.priority,
            participants: Vec::new(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Assigned participants in assignment order, without duplicates.
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    pub fn has_participant(&self, participant: ParticipantId) -> bool {
        self.participants.contains(&participant)
    }

    pub(crate) fn set_interval(&mut self, interval: Interval) {
        self.interval = interval;
    }

    pub(crate) fn apply_details(&mut self, changes: EventChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(location) = changes.location {
            self.location = location;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
    }

    pub(crate) fn push_participant(&mut self, participant: ParticipantId) {
        debug_assert!(!self.has_participant(participant));
        self.participants.push(participant);
    }

    pub(crate) fn remove_participant(&mut self, participant: ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| *p != participant);
        self.participants.len() != before
    }
}

impl AsRef<Event> for Event {
    fn as_ref(&self) -> &Event {
        self
    }
}
