//! Per-participant availability ledger.
//!
//! A ledger is the list of intervals a participant has declared free and that
//! no assigned event has consumed yet. Assigning an event carves its span out
//! of one free block; unassigning hands the span back.
//!
//! Availability is a containment question, not an overlap question: a
//! participant is free for `[s, e)` only when a single ledger interval covers
//! the whole span. Two adjacent free blocks that together cover it do not
//! count, which is why [`ReleasePolicy::Coalesce`] exists.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::interval::Interval;

/// How [`AvailabilityLedger::unassign`] returns a span to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleasePolicy {
    /// Merge the span with every ledger interval it touches or overlaps, so
    /// contiguous free time stays one block.
    #[default]
    Coalesce,
    /// Push the span as a new entry without merging. Adjacent blocks
    /// accumulate and stay separate.
    Append,
}

/// The free intervals of one participant.
///
/// Intervals are kept in ledger order: the order they were declared, with
/// remainders of an assignment taking the place of the block they came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailabilityLedger {
    slots: Vec<Interval>,
}

impl AvailabilityLedger {
    /// Build a ledger from declared free slots.
    ///
    /// Input slots are taken as given: they are not required to be disjoint
    /// and are not merged.
    pub fn new(slots: impl IntoIterator<Item = Interval>) -> Self {
        Self {
            slots: slots.into_iter().collect(),
        }
    }

    pub fn slots(&self) -> &[Interval] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` iff some ledger interval fully contains `interval`.
    pub fn is_free_during(&self, interval: &Interval) -> bool {
        self.covering_slot(interval).is_some()
    }

    /// Consume `interval` from the first ledger interval that contains it.
    ///
    /// The containing block is replaced, in place, by up to two remainders:
    /// `[slot.start, interval.start)` and `[interval.end, slot.end)`, each kept
    /// only when non-empty.
    ///
    /// # Errors
    /// Returns `ScheduleError::Unavailable` if no block contains `interval`.
    /// The ledger is unchanged in that case.
    pub fn assign(&mut self, interval: &Interval) -> Result<()> {
        let pos = self
            .covering_slot(interval)
            .ok_or(ScheduleError::Unavailable(*interval))?;

        let (before, after) = self.slots[pos].split_around(interval);
        self.slots.splice(pos..=pos, before.into_iter().chain(after));
        Ok(())
    }

    /// Hand `interval` back to the ledger as free time.
    ///
    /// With [`ReleasePolicy::Append`] this is the exact inverse of a prior
    /// [`assign`](Self::assign) only when nothing else touched the ledger in
    /// between. With [`ReleasePolicy::Coalesce`] the span is merged with every
    /// block it touches or overlaps; the merged block takes the position of
    /// the first block absorbed, or goes to the end when none was.
    pub fn unassign(&mut self, interval: &Interval, policy: ReleasePolicy) {
        match policy {
            ReleasePolicy::Append => self.slots.push(*interval),
            ReleasePolicy::Coalesce => self.coalesce(*interval),
        }
    }

    fn coalesce(&mut self, interval: Interval) {
        let mut merged = interval;
        let mut absorbed = vec![false; self.slots.len()];

        // Absorbing a block can widen `merged` enough to reach blocks already
        // passed over, so repeat until a pass absorbs nothing.
        loop {
            let mut changed = false;
            for (slot, taken) in self.slots.iter().zip(absorbed.iter_mut()) {
                if !*taken && slot.touches_or_overlaps(&merged) {
                    merged = merged.span(slot);
                    *taken = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let Some(first) = absorbed.iter().position(|taken| *taken) else {
            self.slots.push(merged);
            return;
        };

        let old = std::mem::take(&mut self.slots);
        for (i, (slot, taken)) in old.into_iter().zip(absorbed).enumerate() {
            if i == first {
                self.slots.push(merged);
            }
            if !taken {
                self.slots.push(slot);
            }
        }
    }

    fn covering_slot(&self, interval: &Interval) -> Option<usize> {
        self.slots.iter().position(|slot| slot.contains(interval))
    }
}
