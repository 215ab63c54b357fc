//! Line-oriented text format for persisting a registry.
//!
//! Two documents, one record per line, fields separated by `|`:
//!
//! ```text
//! # participants: name | access | start~end,start~end
//! Alice | ADMIN | 2026-03-02 09:00~2026-03-02 10:00,2026-03-02 11:00~2026-03-02 17:00
//!
//! # events: name | start | end | location | description | priority | participant:access,...
//! Standup | 2026-03-02 10:00 | 2026-03-02 11:00 | Room 1 | Daily sync | HIGH | Alice:ADMIN
//! ```
//!
//! Participant ledgers are stored as they stand, after consumption, so events
//! are loaded with [`EventRegistry::restore_event`] and never consume again.
//! Participant references on event lines resolve by name, ignoring case.
//! Blank lines and lines starting with `#` are skipped, so names that open a
//! line may not start with `#`. Fields are trimmed on decode; encoding rejects
//! any field with surrounding whitespace.

use crate::error::{Result, ScheduleError};
use crate::event::{AccessLevel, Event, EventDraft, Participant, ParticipantId};
use crate::interval::{format_timestamp, parse_timestamp, Interval};
use crate::ledger::ReleasePolicy;
use crate::priority::Priority;
use crate::registry::EventRegistry;

const FIELD_SEP: char = '|';
const LIST_SEP: char = ',';
const SLOT_SEP: char = '~';
const ACCESS_SEP: char = ':';
const COMMENT: char = '#';

const EVENT_FIELDS: usize = 7;
const PARTICIPANT_FIELDS: usize = 3;

/// A decoded participant line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRecord {
    pub name: String,
    pub access: AccessLevel,
    pub free_slots: Vec<Interval>,
}

/// A decoded event line. Participant names are not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub draft: EventDraft,
    pub participants: Vec<(String, AccessLevel)>,
}

/// Both documents of a saved registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub participants: String,
    pub events: String,
}

// ── Encoding ────────────────────────────────────────────────────────────────

/// Fields are trimmed on decode, so surrounding whitespace would not survive.
fn check_field(value: &str, what: &str) -> Result<()> {
    if value.contains(FIELD_SEP) || value.contains('\n') || value.contains('\r') {
        return Err(ScheduleError::Encode(format!(
            "{what} '{value}' contains '|' or a line break"
        )));
    }
    if value.trim() != value {
        return Err(ScheduleError::Encode(format!(
            "{what} '{value}' has leading or trailing whitespace"
        )));
    }
    Ok(())
}

/// A field that opens a line must not read back as a comment.
fn check_leading(value: &str, what: &str) -> Result<()> {
    check_field(value, what)?;
    if value.starts_with(COMMENT) {
        return Err(ScheduleError::Encode(format!(
            "{what} '{value}' starts with '{COMMENT}'"
        )));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ScheduleError::EmptyParticipantName);
    }
    check_leading(name, "participant name")?;
    if name.contains(LIST_SEP) || name.contains(ACCESS_SEP) {
        return Err(ScheduleError::Encode(format!(
            "participant name '{name}' contains ',' or ':'"
        )));
    }
    Ok(())
}

pub fn encode_participant(participant: &Participant) -> Result<String> {
    check_name(participant.name())?;
    let slots: Vec<String> = participant
        .availability()
        .slots()
        .iter()
        .map(|slot| {
            format!(
                "{}{SLOT_SEP}{}",
                format_timestamp(&slot.start()),
                format_timestamp(&slot.end())
            )
        })
        .collect();
    Ok(format!(
        "{} | {} | {}",
        participant.name(),
        participant.access(),
        slots.join(",")
    ))
}

/// Encode one event; `participants` is the registry's participant arena.
pub fn encode_event(event: &Event, participants: &[Participant]) -> Result<String> {
    check_leading(event.name(), "event name")?;
    check_field(event.location(), "location")?;
    check_field(event.description(), "description")?;

    let mut refs = Vec::with_capacity(event.participants().len());
    for pid in event.participants() {
        let p = participants
            .get(pid.0)
            .ok_or_else(|| ScheduleError::UnknownParticipant(format!("#{}", pid.0)))?;
        check_name(p.name())?;
        refs.push(format!("{}{ACCESS_SEP}{}", p.name(), p.access()));
    }

    let interval = event.interval();
    Ok(format!(
        "{} | {} | {} | {} | {} | {} | {}",
        event.name(),
        format_timestamp(&interval.start()),
        format_timestamp(&interval.end()),
        event.location(),
        event.description(),
        event.priority(),
        refs.join(",")
    ))
}

/// Encode a whole registry, participants first.
pub fn save(registry: &EventRegistry) -> Result<Snapshot> {
    let mut participants = String::new();
    for p in registry.participants() {
        participants.push_str(&encode_participant(p)?);
        participants.push('\n');
    }

    let mut events = String::new();
    for e in registry.events() {
        events.push_str(&encode_event(e, registry.participants())?);
        events.push('\n');
    }

    Ok(Snapshot {
        participants,
        events,
    })
}

// ── Decoding ────────────────────────────────────────────────────────────────

fn parse_error(line: usize, message: impl Into<String>) -> ScheduleError {
    ScheduleError::Parse {
        line,
        message: message.into(),
    }
}

/// Split a record into exactly `expected` trimmed fields.
fn split_fields(text: &str, line: usize, expected: usize) -> Result<Vec<&str>> {
    let fields: Vec<&str> = text.split(FIELD_SEP).map(str::trim).collect();
    if fields.len() != expected {
        return Err(parse_error(
            line,
            format!("expected {expected} fields, found {}", fields.len()),
        ));
    }
    Ok(fields)
}

/// Re-tag an engine error with the line it came from.
fn at_line(line: usize) -> impl Fn(ScheduleError) -> ScheduleError {
    move |e| parse_error(line, e.to_string())
}

fn records(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with(COMMENT))
}

pub fn decode_participant(text: &str, line: usize) -> Result<ParticipantRecord> {
    let fields = split_fields(text, line, PARTICIPANT_FIELDS)?;
    if fields[0].is_empty() {
        return Err(parse_error(line, "empty participant name"));
    }
    let access: AccessLevel = fields[1].parse().map_err(at_line(line))?;

    let mut free_slots = Vec::new();
    for raw in fields[2].split(LIST_SEP).map(str::trim).filter(|s| !s.is_empty()) {
        let (start, end) = raw
            .split_once(SLOT_SEP)
            .ok_or_else(|| parse_error(line, format!("slot '{raw}' is not start~end")))?;
        free_slots.push(Interval::parse(start, end).map_err(at_line(line))?);
    }

    Ok(ParticipantRecord {
        name: fields[0].to_string(),
        access,
        free_slots,
    })
}

pub fn decode_event(text: &str, line: usize) -> Result<EventRecord> {
    let fields = split_fields(text, line, EVENT_FIELDS)?;
    let start = parse_timestamp(fields[1]).map_err(at_line(line))?;
    let end = parse_timestamp(fields[2]).map_err(at_line(line))?;
    let priority: Priority = fields[5].parse().map_err(at_line(line))?;

    let mut participants = Vec::new();
    for raw in fields[6].split(LIST_SEP).map(str::trim).filter(|s| !s.is_empty()) {
        let (name, access) = raw.rsplit_once(ACCESS_SEP).ok_or_else(|| {
            parse_error(line, format!("participant '{raw}' is not name:access"))
        })?;
        let access: AccessLevel = access.parse().map_err(at_line(line))?;
        participants.push((name.trim().to_string(), access));
    }

    Ok(EventRecord {
        draft: EventDraft {
            name: fields[0].to_string(),
            start,
            end,
            location: fields[3].to_string(),
            description: fields[4].to_string(),
            priority,
        },
        participants,
    })
}

/// Rebuild a registry from its two documents.
///
/// The access level written next to a participant reference on an event line
/// is informational; the participant document is authoritative.
pub fn load(participants: &str, events: &str, policy: ReleasePolicy) -> Result<EventRegistry> {
    let mut registry = EventRegistry::with_policy(policy);

    for (line, text) in records(participants) {
        let record = decode_participant(text, line)?;
        registry
            .add_participant(&record.name, record.access, record.free_slots)
            .map_err(at_line(line))?;
    }

    for (line, text) in records(events) {
        let record = decode_event(text, line)?;
        let ids = record
            .participants
            .iter()
            .map(|(name, _)| registry.participant_by_name(name))
            .collect::<Result<Vec<ParticipantId>>>()
            .map_err(at_line(line))?;
        registry
            .restore_event(record.draft, &ids)
            .map_err(at_line(line))?;
    }

    Ok(registry)
}
