//! `schedule` CLI — manage events, participants, and availability from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Register participants with their free time
//! schedule add-participant Alice --access admin --free "2026-03-02 09:00~2026-03-02 17:00"
//!
//! # Add an event (collisions with other events are reported, not fatal)
//! schedule add --name Standup --start "2026-03-02 10:00" --end "2026-03-02 11:00" --priority high
//!
//! # Assign a participant; fails if no free block covers the event
//! schedule assign 0 alice
//!
//! # Move the event; rolled back if any assigned participant is busy
//! schedule edit 0 --start "2026-03-02 14:00" --end "2026-03-02 15:00"
//!
//! # List, filter, and inspect
//! schedule list --sort end
//! schedule filter 1 2
//! schedule conflicts
//! schedule common-free alice bob --from "2026-03-02 08:00" --to "2026-03-02 18:00"
//! ```

mod config;
mod store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schedule_engine::availability::{common_free_slots, find_first_common_slot};
use schedule_engine::{
    find_first_free_slot, format_timestamp, free_slots, parse_timestamp, AccessLevel, Collision,
    Event, EventChanges, EventDraft, EventRegistry, FreeSlot, Interval, Priority, SortKey,
    Timestamp,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::store::Store;

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Schedule events for participants with availability checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults to ./schedule.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the data files (overrides storage.data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a participant and their free time
    AddParticipant {
        name: String,
        /// ADMIN or MEMBER
        #[arg(long, default_value = "member")]
        access: AccessLevel,
        /// Free slot as "START~END" (repeatable)
        #[arg(long = "free", value_name = "START~END", value_parser = parse_slot)]
        free: Vec<Interval>,
    },
    /// List participants and their remaining free time
    Participants,
    /// Show a participant's free slots within a window
    Free {
        name: String,
        #[arg(long, value_parser = parse_time)]
        from: Timestamp,
        #[arg(long, value_parser = parse_time)]
        to: Timestamp,
        /// Only show the first slot at least this long
        #[arg(long)]
        min_minutes: Option<i64>,
    },
    /// Show time when all named participants are free
    CommonFree {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long, value_parser = parse_time)]
        from: Timestamp,
        #[arg(long, value_parser = parse_time)]
        to: Timestamp,
        /// Only show the first slot at least this long
        #[arg(long)]
        min_minutes: Option<i64>,
    },
    /// Add an event
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_time)]
        start: Timestamp,
        #[arg(long, value_parser = parse_time)]
        end: Timestamp,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        description: String,
        /// HIGH, MEDIUM or LOW
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// Edit an event's fields; time changes move assigned participants
    Edit {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_time)]
        start: Option<Timestamp>,
        #[arg(long, value_parser = parse_time)]
        end: Option<Timestamp>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Delete an event and free its participants
    Delete { index: usize },
    /// Assign a participant to an event
    Assign { index: usize, participant: String },
    /// Remove a participant from an event
    Unassign { index: usize, participant: String },
    /// List events
    List {
        /// priority, start or end (defaults to display.default_sort)
        #[arg(long)]
        sort: Option<SortKey>,
        /// Store the sorted order, renumbering events
        #[arg(long)]
        apply: bool,
    },
    /// List events whose priority rank lies in [LOWER, UPPER]
    Filter { lower: u8, upper: u8 },
    /// List every pair of overlapping events
    Conflicts,
}

fn parse_time(s: &str) -> std::result::Result<Timestamp, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

fn parse_slot(s: &str) -> std::result::Result<Interval, String> {
    let (start, end) = s
        .split_once('~')
        .ok_or_else(|| format!("slot '{s}' is not START~END"))?;
    Interval::parse(start, end).map_err(|e| e.to_string())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    let store = Store::from_config(&config);
    let mut registry = store.load()?;
    let out = Output { json: cli.json };

    let mutated = run(cli.command, &mut registry, &config, &out)?;
    if mutated {
        store.save(&registry)?;
    }
    Ok(())
}

/// Execute one command. Returns whether the registry changed.
fn run(command: Commands, registry: &mut EventRegistry, config: &Config, out: &Output) -> Result<bool> {
    match command {
        Commands::AddParticipant { name, access, free } => {
            registry.add_participant(&name, access, free)?;
            tracing::info!(%name, "participant added");
            out.message(&format!("Added participant {name}"));
            Ok(true)
        }
        Commands::Participants => {
            let views: Vec<ParticipantView> = registry
                .participants()
                .iter()
                .map(|p| ParticipantView {
                    name: p.name().to_string(),
                    access: p.access(),
                    free: p.availability().slots().iter().map(SlotView::from).collect(),
                })
                .collect();
            out.participants(&views)?;
            Ok(false)
        }
        Commands::Free {
            name,
            from,
            to,
            min_minutes,
        } => {
            let window = Interval::new(from, to)?;
            let id = registry.participant_by_name(&name)?;
            let ledger = registry.participant(id)?.availability();
            let slots: Vec<FreeSlot> = match min_minutes {
                Some(min) => find_first_free_slot(ledger, &window, min).into_iter().collect(),
                None => free_slots(ledger, &window),
            };
            out.slots(&slots)?;
            Ok(false)
        }
        Commands::CommonFree {
            names,
            from,
            to,
            min_minutes,
        } => {
            let window = Interval::new(from, to)?;
            let ledgers = names
                .iter()
                .map(|n| -> schedule_engine::Result<_> {
                    let id = registry.participant_by_name(n)?;
                    Ok(registry.participant(id)?.availability())
                })
                .collect::<schedule_engine::Result<Vec<_>>>()?;
            let slots: Vec<FreeSlot> = match min_minutes {
                Some(min) => find_first_common_slot(&ledgers, &window, min)
                    .into_iter()
                    .collect(),
                None => common_free_slots(&ledgers, &window),
            };
            out.slots(&slots)?;
            Ok(false)
        }
        Commands::Add {
            name,
            start,
            end,
            location,
            description,
            priority,
        } => {
            let draft = EventDraft {
                name,
                start,
                end,
                location,
                description,
                priority,
            };
            let (event, collisions) = registry.add_event(draft)?;
            let (id, name) = (event.id(), event.name().to_string());
            let index = registry.len() - 1;
            tracing::info!(index, %id, "event added");
            out.message(&format!("Added event {index}: {name}"));
            out.collisions(&collisions)?;
            Ok(true)
        }
        Commands::Edit {
            index,
            name,
            start,
            end,
            location,
            description,
            priority,
        } => {
            let changes = EventChanges {
                name,
                start,
                end,
                location,
                description,
                priority,
            };
            if changes.is_empty() {
                anyhow::bail!("Nothing to edit: pass at least one field to change");
            }
            let collisions = registry.edit_event(index, changes)?;
            tracing::info!(index, "event edited");
            out.message(&format!("Updated event {index}"));
            out.collisions(&collisions)?;
            Ok(true)
        }
        Commands::Delete { index } => {
            let removed = registry.delete_event(index)?;
            tracing::info!(index, id = %removed.id(), "event deleted");
            out.message(&format!("Deleted event {index}: {}", removed.name()));
            Ok(true)
        }
        Commands::Assign { index, participant } => {
            let id = registry.participant_by_name(&participant)?;
            registry.assign_participant(index, id)?;
            tracing::info!(index, %participant, "participant assigned");
            out.message(&format!("Assigned {participant} to event {index}"));
            Ok(true)
        }
        Commands::Unassign { index, participant } => {
            let id = registry.participant_by_name(&participant)?;
            registry.unassign_participant(index, id)?;
            tracing::info!(index, %participant, "participant unassigned");
            out.message(&format!("Removed {participant} from event {index}"));
            Ok(true)
        }
        Commands::List { sort, apply } => {
            let key = sort.unwrap_or(config.display.default_sort);
            if apply {
                registry.sort_events(key);
                let views = event_views(registry, registry.events().iter());
                out.events(&views)?;
                return Ok(true);
            }
            let views = event_views(registry, registry.sorted(key));
            out.events(&views)?;
            Ok(false)
        }
        Commands::Filter { lower, upper } => {
            let kept = registry.filter_by_priority_range(lower, upper)?;
            let views = event_views(registry, kept);
            out.events(&views)?;
            Ok(false)
        }
        Commands::Conflicts => {
            let views: Vec<ConflictView> = registry
                .conflicts()
                .into_iter()
                .filter_map(|c| {
                    Some(ConflictView {
                        first: registry.position_of(c.first)?,
                        second: registry.position_of(c.second)?,
                        overlap_minutes: c.overlap_minutes,
                    })
                })
                .collect();
            out.conflicts(registry, &views)?;
            Ok(false)
        }
    }
}

// ---------------------------------------------------------------------------
// Output DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SlotView {
    start: String,
    end: String,
}

impl From<&Interval> for SlotView {
    fn from(i: &Interval) -> Self {
        Self {
            start: format_timestamp(&i.start()),
            end: format_timestamp(&i.end()),
        }
    }
}

#[derive(Serialize)]
struct ParticipantView {
    name: String,
    access: AccessLevel,
    free: Vec<SlotView>,
}

#[derive(Serialize)]
struct EventView {
    index: usize,
    id: u64,
    name: String,
    start: String,
    end: String,
    location: String,
    description: String,
    priority: Priority,
    participants: Vec<String>,
}

#[derive(Serialize)]
struct ConflictView {
    first: usize,
    second: usize,
    overlap_minutes: i64,
}

fn event_views<'a>(
    registry: &EventRegistry,
    events: impl IntoIterator<Item = &'a Event>,
) -> Vec<EventView> {
    events
        .into_iter()
        .map(|e| EventView {
            index: registry.position_of(e.id()).unwrap_or_default(),
            id: e.id().0,
            name: e.name().to_string(),
            start: format_timestamp(&e.interval().start()),
            end: format_timestamp(&e.interval().end()),
            location: e.location().to_string(),
            description: e.description().to_string(),
            priority: e.priority(),
            participants: e
                .participants()
                .iter()
                .filter_map(|&p| registry.participant(p).ok())
                .map(|p| p.name().to_string())
                .collect(),
        })
        .collect()
}

struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn message(&self, text: &str) {
        if !self.json {
            println!("{text}");
        }
    }

    fn collisions(&self, collisions: &[Collision]) -> Result<()> {
        if collisions.is_empty() {
            return Ok(());
        }
        if self.json {
            return self.print_json(collisions);
        }
        println!("Warning: overlaps {} other event(s):", collisions.len());
        for c in collisions {
            println!("  {}: {} {}", c.index, c.name, c.interval);
        }
        Ok(())
    }

    fn events(&self, events: &[EventView]) -> Result<()> {
        if self.json {
            return self.print_json(events);
        }
        if events.is_empty() {
            println!("No events.");
        }
        for e in events {
            println!(
                "{:>3}  {} - {}  [{}] {}",
                e.index, e.start, e.end, e.priority, e.name
            );
            if !e.location.is_empty() {
                println!("     at {}", e.location);
            }
            if !e.description.is_empty() {
                println!("     {}", e.description);
            }
            if !e.participants.is_empty() {
                println!("     with {}", e.participants.join(", "));
            }
        }
        Ok(())
    }

    fn participants(&self, participants: &[ParticipantView]) -> Result<()> {
        if self.json {
            return self.print_json(participants);
        }
        if participants.is_empty() {
            println!("No participants.");
        }
        for p in participants {
            println!("{} ({})", p.name, p.access);
            for slot in &p.free {
                println!("  free {} - {}", slot.start, slot.end);
            }
        }
        Ok(())
    }

    fn slots(&self, slots: &[FreeSlot]) -> Result<()> {
        if self.json {
            return self.print_json(slots);
        }
        if slots.is_empty() {
            println!("No free time.");
        }
        for s in slots {
            println!(
                "{} - {}  ({} min)",
                format_timestamp(&s.start),
                format_timestamp(&s.end),
                s.duration_minutes
            );
        }
        Ok(())
    }

    fn conflicts(&self, registry: &EventRegistry, conflicts: &[ConflictView]) -> Result<()> {
        if self.json {
            return self.print_json(conflicts);
        }
        if conflicts.is_empty() {
            println!("No conflicts.");
        }
        for c in conflicts {
            let name = |i: usize| registry.event(i).map(|e| e.name().to_string()).unwrap_or_default();
            println!(
                "{} ({}) overlaps {} ({}) by {} min",
                c.first,
                name(c.first),
                c.second,
                name(c.second),
                c.overlap_minutes
            );
        }
        Ok(())
    }
}
