//! Same-night, same-city collisions between legends.

use std::borrow::Borrow;
use std::collections::HashMap;

use crate::domain::StaticEvent;

/// Event id to the legend ids sharing that event's (date, city).
///
/// Only events whose group holds two or more events have an entry. Legend ids
/// are listed in event order and are not deduplicated: a legend with two dates
/// in the same city on the same day appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapIndex {
    by_event: HashMap<String, Vec<String>>,
}

impl OverlapIndex {
    pub fn get(&self, event_id: &str) -> Option<&[String]> {
        self.by_event.get(event_id).map(Vec::as_slice)
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.by_event.contains_key(event_id)
    }

    pub fn len(&self) -> usize {
        self.by_event.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty()
    }

    /// The other legends playing alongside `event`, in group order.
    pub fn also_playing<'a>(&'a self, event: &'a StaticEvent) -> impl Iterator<Item = &'a str> {
        self.get(&event.id)
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .filter(move |legend_id| *legend_id != event.legend_id)
    }
}

fn group_key(event: &StaticEvent) -> (&str, String) {
    (event.date.as_str(), event.city.to_lowercase())
}

/// Flag every event that shares its date and (case-insensitive) city with at
/// least one other event in `events`.
pub fn detect_overlaps<E: Borrow<StaticEvent>>(events: &[E]) -> OverlapIndex {
    let mut groups: HashMap<(&str, String), Vec<&str>> = HashMap::new();
    for event in events {
        let event = event.borrow();
        groups
            .entry(group_key(event))
            .or_default()
            .push(event.legend_id.as_str());
    }

    let mut by_event = HashMap::new();
    for event in events {
        let event = event.borrow();
        if let Some(legends) = groups.get(&group_key(event)) {
            if legends.len() > 1 {
                by_event.insert(
                    event.id.clone(),
                    legends.iter().map(|id| (*id).to_string()).collect(),
                );
            }
        }
    }

    OverlapIndex { by_event }
}
