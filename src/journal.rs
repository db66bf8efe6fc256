use log::{debug, info};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::collections::{Queue, Stack};
use crate::domain::{Clock, Entry};
use crate::normalize::{normalize_entry, repair_entry};
use crate::render::render_entry;
use crate::storage::{EntryStore, StoreError};
use crate::trend::{TrendPoint, mood_trend};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the in-memory collection and keeps the store in step with it.
///
/// Every mutation writes the full collection before the in-memory state
/// changes, so a failed write leaves both sides as they were.
pub struct JournalManager<S: EntryStore> {
    store: S,
    clock: Box<dyn Clock>,
    entries: Vec<Entry>,
    undo: Stack<Entry>,
    queue: Queue<usize>,
}

impl<S: EntryStore> JournalManager<S> {
    /// Loads the collection and repairs malformed entries. A repaired
    /// collection is written back straight away.
    pub fn load(mut store: S, clock: Box<dyn Clock>) -> Result<Self, JournalError> {
        let today = clock.today();
        let mut repaired = 0;
        let entries = store
            .all()
            .iter()
            .map(|value| {
                let (entry, changed) = repair_entry(value, today);
                if changed {
                    repaired += 1;
                }
                entry
            })
            .collect::<Vec<_>>();

        if repaired > 0 {
            info!("repaired {repaired} malformed journal entries");
            store.write(&entries)?;
        }

        let mut manager = Self {
            store,
            clock,
            entries,
            undo: Stack::new(),
            queue: Queue::new(),
        };
        manager.rebuild_queue();
        Ok(manager)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Normalizes and renders a submitted form, then appends it. Returns the
    /// position of the new entry.
    pub fn add(&mut self, raw: &Map<String, Value>) -> Result<usize, JournalError> {
        let entry = normalize_entry(raw, self.clock.today());
        let rendered = render_entry(&entry);

        let mut next = self.entries.clone();
        next.push(rendered.clone());
        self.store.write(&next)?;
        self.entries = next;

        let index = self.entries.len() - 1;
        debug!("added entry {index} for {}", rendered.date);
        self.undo.push(rendered);
        self.queue.enqueue(index);
        Ok(index)
    }

    /// Removes the entry at `index`. Later entries shift down by one.
    pub fn delete(&mut self, index: usize) -> Result<bool, JournalError> {
        let Some(entry) = self.entries.get(index).cloned() else {
            debug!("delete ignored: no entry at {index}");
            return Ok(false);
        };

        self.remove_at(index)?;
        self.undo.push(entry);
        Ok(true)
    }

    /// Pops the latest snapshot and removes the first entry sharing its date
    /// and mood. Returns false when the history is empty or nothing matches;
    /// the snapshot is dropped either way.
    pub fn undo_last(&mut self) -> Result<bool, JournalError> {
        let Some(snapshot) = self.undo.pop() else {
            return Ok(false);
        };

        let Some(position) = self
            .entries
            .iter()
            .position(|entry| entry.same_day_and_mood(&snapshot))
        else {
            debug!("undo found no entry for {} {}", snapshot.date, snapshot.mood);
            return Ok(false);
        };

        if let Err(err) = self.remove_at(position) {
            self.undo.push(snapshot);
            return Err(err);
        }
        Ok(true)
    }

    /// Average `waterCount` over the queued indices. The queue is drained and
    /// refilled in the same order; indices no longer in the collection are
    /// skipped.
    pub fn average_water(&mut self) -> f64 {
        let mut drained = Vec::with_capacity(self.queue.len());
        let mut sum = 0_i128;
        let mut present = 0_usize;

        while let Some(index) = self.queue.dequeue() {
            if let Some(entry) = self.entries.get(index) {
                sum += i128::from(entry.water_count);
                present += 1;
            }
            drained.push(index);
        }

        for index in drained {
            self.queue.enqueue(index);
        }

        if present == 0 {
            0.0
        } else {
            sum as f64 / present as f64
        }
    }

    pub fn mood_trend(&self) -> Vec<TrendPoint> {
        mood_trend(&self.entries)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn last_undoable(&self) -> Option<&Entry> {
        self.undo.peek()
    }

    pub fn queued_indices(&self) -> Vec<usize> {
        self.queue.iter().copied().collect()
    }

    fn remove_at(&mut self, index: usize) -> Result<(), JournalError> {
        let mut next = self.entries.clone();
        next.remove(index);
        self.store.write(&next)?;
        self.entries = next;
        self.rebuild_queue();
        debug!("removed entry {index}; {} remain", self.entries.len());
        Ok(())
    }

    fn rebuild_queue(&mut self) {
        self.queue = Queue::new();
        for index in 0..self.entries.len() {
            self.queue.enqueue(index);
        }
    }
}
