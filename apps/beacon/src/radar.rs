//! The user's saved events.
//!
//! Full event snapshots are stored, not ids, so the radar renders without the
//! catalog. Memory is the source of truth for the session; the store is read
//! once at load and rewritten in full after every change. Two contexts editing
//! the same radar overwrite each other's snapshot, last write wins.

use log::debug;

use crate::domain::StaticEvent;
use crate::storage::{persist_json, read_json_or, KeyValueStore, StorageKey};

#[derive(Debug)]
pub struct RadarStore<S> {
    store: S,
    events: Vec<StaticEvent>,
}

impl<S: KeyValueStore> RadarStore<S> {
    pub fn load(store: S) -> Self {
        let stored: Vec<StaticEvent> = read_json_or(&store, StorageKey::RadarEvents, Vec::new);
        let mut events: Vec<StaticEvent> = Vec::with_capacity(stored.len());
        for event in stored {
            if !events.iter().any(|saved| saved.id == event.id) {
                events.push(event);
            }
        }
        sort_by_date(&mut events);
        Self { store, events }
    }

    /// Saved events, earliest first.
    pub fn events(&self) -> &[StaticEvent] {
        &self.events
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.events.iter().any(|event| event.id == event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Save `event`. Returns `false` without touching storage when an event with
    /// the same id is already saved.
    pub fn add(&mut self, event: StaticEvent) -> bool {
        if self.contains(&event.id) {
            return false;
        }
        debug!("radar add {}", event.id);
        self.events.push(event);
        sort_by_date(&mut self.events);
        self.persist();
        true
    }

    /// Drop every saved event with `event_id`. Returns whether one was removed.
    pub fn remove(&mut self, event_id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != event_id);
        let removed = self.events.len() != before;
        debug!("radar remove {event_id}: {removed}");
        self.persist();
        removed
    }

    /// Add when absent, remove when present. Returns whether it is saved afterwards.
    pub fn toggle(&mut self, event: &StaticEvent) -> bool {
        if self.contains(&event.id) {
            self.remove(&event.id);
            false
        } else {
            self.add(event.clone())
        }
    }

    fn persist(&self) {
        persist_json(&self.store, StorageKey::RadarEvents, &self.events);
    }
}

fn sort_by_date(events: &mut [StaticEvent]) {
    events.sort_by(|a, b| a.date.cmp(&b.date));
}
