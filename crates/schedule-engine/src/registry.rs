//! The event registry: owns events and participants and keeps their interval
//! state consistent.
//!
//! Every mutation that touches more than one ledger (editing an assigned
//! event's time) records each ledger before changing it and restores all of
//! them if any participant turns out to be unavailable. A failed call leaves
//! events and ledgers exactly as they were.

use serde::Serialize;

use crate::conflict::{self, Conflict};
use crate::error::{Result, ScheduleError};
use crate::event::{
    AccessLevel, Event, EventChanges, EventDraft, EventId, Participant, ParticipantId,
};
use crate::interval::Interval;
use crate::ledger::{AvailabilityLedger, ReleasePolicy};
use crate::priority::{self, SortKey};

/// An existing event that overlaps a new or moved one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collision {
    /// Position of the colliding event when the report was made.
    pub index: usize,
    pub id: EventId,
    pub name: String,
    pub interval: Interval,
}

/// Ledger snapshots taken before a multi-participant change.
///
/// Restoring walks the log backwards, so a participant recorded twice ends up
/// with its earliest state.
#[derive(Debug, Default)]
struct LedgerJournal {
    entries: Vec<(ParticipantId, AvailabilityLedger)>,
}

impl LedgerJournal {
    fn record(&mut self, id: ParticipantId, ledger: &AvailabilityLedger) {
        self.entries.push((id, ledger.clone()));
    }

    fn rollback(self, participants: &mut [Participant]) {
        for (id, ledger) in self.entries.into_iter().rev() {
            *participants[id.0].availability_mut() = ledger;
        }
    }
}

/// Owns the events and participants of one schedule.
///
/// Events are addressed by position. Deleting or sorting renumbers the events
/// after the affected position; [`EventId`]s stay stable.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    events: Vec<Event>,
    participants: Vec<Participant>,
    next_id: u64,
    policy: ReleasePolicy,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ReleasePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    // ── Participants ────────────────────────────────────────────────────────

    /// Register a participant with its declared free slots.
    ///
    /// # Errors
    /// - `EmptyParticipantName` if the name is empty or only whitespace.
    /// - `DuplicateParticipant` if a participant with the same name (ignoring
    ///   case) already exists.
    pub fn add_participant(
        &mut self,
        name: &str,
        access: AccessLevel,
        free_slots: impl IntoIterator<Item = Interval>,
    ) -> Result<ParticipantId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScheduleError::EmptyParticipantName);
        }
        if self.participants.iter().any(|p| p.same_name(name)) {
            return Err(ScheduleError::DuplicateParticipant(name.to_string()));
        }
        self.participants.push(Participant::new(
            name,
            access,
            AvailabilityLedger::new(free_slots),
        ));
        Ok(ParticipantId(self.participants.len() - 1))
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Result<&Participant> {
        self.participants
            .get(id.0)
            .ok_or_else(|| ScheduleError::UnknownParticipant(format!("#{}", id.0)))
    }

    /// Look a participant up by name, ignoring case.
    pub fn participant_by_name(&self, name: &str) -> Result<ParticipantId> {
        self.participants
            .iter()
            .position(|p| p.same_name(name))
            .map(ParticipantId)
            .ok_or_else(|| ScheduleError::UnknownParticipant(name.trim().to_string()))
    }

    // ── Events ──────────────────────────────────────────────────────────────

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event(&self, index: usize) -> Result<&Event> {
        self.events.get(index).ok_or(ScheduleError::InvalidIndex {
            index,
            len: self.events.len(),
        })
    }

    pub fn position_of(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id() == id)
    }

    /// Add an event.
    ///
    /// Overlaps with existing events do not block the add; they are returned
    /// alongside the new event as an advisory.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidInterval` if the draft's end is not
    /// after its start.
    pub fn add_event(&mut self, draft: EventDraft) -> Result<(&Event, Vec<Collision>)> {
        let interval = Interval::new(draft.start, draft.end)?;
        let collisions = self.collisions_for(&interval, None);
        let id = self.allocate_id();
        self.events.push(Event::from_draft(id, interval, draft));
        let event = &self.events[self.events.len() - 1];
        Ok((event, collisions))
    }

    /// Add an event whose participants' ledgers already account for it.
    ///
    /// Used when loading persisted state, where the stored ledgers were saved
    /// after consumption. No ledger is touched and no availability is checked.
    ///
    /// # Errors
    /// `InvalidInterval` for a bad draft, `UnknownParticipant` for a handle
    /// this registry did not issue, `DuplicateAssignment` for a repeated one.
    pub fn restore_event(
        &mut self,
        draft: EventDraft,
        participants: &[ParticipantId],
    ) -> Result<usize> {
        let interval = Interval::new(draft.start, draft.end)?;
        let mut event = Event::from_draft(EventId(self.next_id), interval, draft);
        for &pid in participants {
            let name = self.participant(pid)?.name().to_string();
            if event.has_participant(pid) {
                return Err(ScheduleError::DuplicateAssignment {
                    participant: name,
                    event: event.name().to_string(),
                });
            }
            event.push_participant(pid);
        }
        self.allocate_id();
        self.events.push(event);
        Ok(self.events.len() - 1)
    }

    /// Remove an event, returning every assigned participant's span to its
    /// ledger first.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidIndex` if `index` is out of bounds.
    pub fn delete_event(&mut self, index: usize) -> Result<Event> {
        let event = self.event(index)?;
        let interval = event.interval();
        let assigned = event.participants().to_vec();
        for pid in assigned {
            self.participants[pid.0]
                .availability_mut()
                .unassign(&interval, self.policy);
        }
        Ok(self.events.remove(index))
    }

    /// Edit an event in place.
    ///
    /// A time change moves every assigned participant from the old span to the
    /// new one, or fails without changing anything. Detail fields (name,
    /// location, description, priority) are applied only once the time change,
    /// if any, has succeeded. Returns the collisions of the resulting interval
    /// when the time changed, otherwise an empty list.
    ///
    /// # Errors
    /// - `InvalidIndex` if `index` is out of bounds.
    /// - `InvalidTimeOrder` if the resulting end is not after the start.
    /// - `ParticipantUnavailable` naming the first participant whose ledger
    ///   cannot cover the new span.
    pub fn edit_event(&mut self, index: usize, changes: EventChanges) -> Result<Vec<Collision>> {
        let event = self.event(index)?;
        let mut collisions = Vec::new();

        if changes.touches_time() {
            let old = event.interval();
            let start = changes.start.unwrap_or(old.start());
            let end = changes.end.unwrap_or(old.end());
            if start >= end {
                return Err(ScheduleError::InvalidTimeOrder { start, end });
            }
            let new = Interval::new(start, end)?;
            let id = event.id();

            if new != old {
                let assigned = event.participants().to_vec();
                self.move_assignments(&assigned, &old, &new)?;
                self.events[index].set_interval(new);
            }
            collisions = self.collisions_for(&new, Some(id));
        }

        self.events[index].apply_details(changes);
        Ok(collisions)
    }

    /// Assign a participant to an event, consuming the event's span from the
    /// participant's ledger.
    ///
    /// # Errors
    /// - `InvalidIndex` / `UnknownParticipant` for bad handles.
    /// - `DuplicateAssignment` if the participant is already on the event.
    /// - `ParticipantUnavailable` if no free block covers the event; the
    ///   ledger is not touched.
    pub fn assign_participant(&mut self, index: usize, participant: ParticipantId) -> Result<()> {
        let event = self.event(index)?;
        let person = self.participant(participant)?;
        let interval = event.interval();

        if event.has_participant(participant) {
            return Err(ScheduleError::DuplicateAssignment {
                participant: person.name().to_string(),
                event: event.name().to_string(),
            });
        }
        if !person.availability().is_free_during(&interval) {
            return Err(ScheduleError::ParticipantUnavailable {
                name: person.name().to_string(),
                interval,
            });
        }

        self.participants[participant.0]
            .availability_mut()
            .assign(&interval)?;
        self.events[index].push_participant(participant);
        Ok(())
    }

    /// Take a participant off an event and return the span to its ledger.
    ///
    /// # Errors
    /// `InvalidIndex` / `UnknownParticipant` for bad handles, `NotAssigned` if
    /// the participant is not on the event.
    pub fn unassign_participant(&mut self, index: usize, participant: ParticipantId) -> Result<()> {
        let event = self.event(index)?;
        let person = self.participant(participant)?;
        if !event.has_participant(participant) {
            return Err(ScheduleError::NotAssigned {
                participant: person.name().to_string(),
                event: event.name().to_string(),
            });
        }
        let interval = event.interval();

        self.events[index].remove_participant(participant);
        self.participants[participant.0]
            .availability_mut()
            .unassign(&interval, self.policy);
        Ok(())
    }

    // ── Views ───────────────────────────────────────────────────────────────

    /// Events overlapping `interval`, in registry order, skipping `own`.
    pub fn collisions_for(&self, interval: &Interval, own: Option<EventId>) -> Vec<Collision> {
        let existing = self.events.iter().map(|e| (e.id(), e.interval()));
        conflict::find_overlaps(interval, own, existing)
            .into_iter()
            .filter_map(|id| {
                let index = self.position_of(id)?;
                let event = &self.events[index];
                Some(Collision {
                    index,
                    id,
                    name: event.name().to_string(),
                    interval: event.interval(),
                })
            })
            .collect()
    }

    /// Every pair of overlapping events, by id.
    pub fn conflicts(&self) -> Vec<Conflict<EventId>> {
        let entries: Vec<(EventId, Interval)> =
            self.events.iter().map(|e| (e.id(), e.interval())).collect();
        conflict::find_conflicts(&entries)
    }

    /// Events in `key` order, without reordering the registry.
    pub fn sorted(&self, key: SortKey) -> Vec<&Event> {
        let mut view: Vec<&Event> = self.events.iter().collect();
        priority::sort_events(&mut view, key);
        view
    }

    /// Reorder the registry itself. Positions are renumbered.
    pub fn sort_events(&mut self, key: SortKey) {
        priority::sort_events(&mut self.events, key);
    }

    /// Events whose rank lies in `[lower, upper]`, in registry order.
    pub fn filter_by_priority_range(&self, lower: u8, upper: u8) -> Result<Vec<&Event>> {
        priority::filter_by_priority_range(lower, upper, &self.events)
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn allocate_id(&mut self) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Move `assigned` participants from `old` to `new`: free the old span for
    /// everyone, check everyone can cover the new span, then consume it.
    fn move_assignments(
        &mut self,
        assigned: &[ParticipantId],
        old: &Interval,
        new: &Interval,
    ) -> Result<()> {
        let mut journal = LedgerJournal::default();

        for &pid in assigned {
            let ledger = self.participants[pid.0].availability_mut();
            journal.record(pid, ledger);
            ledger.unassign(old, self.policy);
        }

        let blocked = assigned
            .iter()
            .find(|pid| !self.participants[pid.0].availability().is_free_during(new));
        if let Some(&pid) = blocked {
            let name = self.participants[pid.0].name().to_string();
            journal.rollback(&mut self.participants);
            return Err(ScheduleError::ParticipantUnavailable {
                name,
                interval: *new,
            });
        }

        for &pid in assigned {
            if self.participants[pid.0].availability_mut().assign(new).is_err() {
                let name = self.participants[pid.0].name().to_string();
                journal.rollback(&mut self.participants);
                return Err(ScheduleError::ParticipantUnavailable {
                    name,
                    interval: *new,
                });
            }
        }

        Ok(())
    }
}
