//! Curated legends and their dates.
//!
//! The catalog is reference data: loaded once, never mutated. Events that point
//! at a legend the catalog does not know are dropped at load time.

mod search;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Legend, StaticEvent};

const BUILTIN_LEGENDS: &str = include_str!("../../data/legends.json");
const BUILTIN_EVENTS: &str = include_str!("../../data/events.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk shape of a catalog override file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    legends: Vec<Legend>,
    events: Vec<StaticEvent>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    legends: Vec<Legend>,
    events: Vec<StaticEvent>,
    positions: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, keeping the first legend for each id and dropping
    /// events whose legend is unknown.
    pub fn new(legends: Vec<Legend>, events: Vec<StaticEvent>) -> Self {
        let mut positions = HashMap::with_capacity(legends.len());
        let mut unique = Vec::with_capacity(legends.len());
        for legend in legends {
            if positions.contains_key(&legend.id) {
                warn!("duplicate legend {} ignored", legend.id);
                continue;
            }
            positions.insert(legend.id.clone(), unique.len());
            unique.push(legend);
        }

        let total = events.len();
        let mut seen_events = HashSet::with_capacity(total);
        let events: Vec<StaticEvent> = events
            .into_iter()
            .filter(|event| {
                if !positions.contains_key(&event.legend_id) {
                    warn!(
                        "event {} dropped: unknown legend {}",
                        event.id, event.legend_id
                    );
                    return false;
                }
                if !seen_events.insert(event.id.clone()) {
                    warn!("duplicate event {} ignored", event.id);
                    return false;
                }
                true
            })
            .collect();

        debug!(
            "catalog loaded: {} legends, {} of {} events",
            unique.len(),
            events.len(),
            total
        );

        Self {
            legends: unique,
            events,
            positions,
        }
    }

    /// The curated roster shipped with the app.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_LEGENDS, BUILTIN_EVENTS)
    }

    pub fn from_json(legends_json: &str, events_json: &str) -> Result<Self, CatalogError> {
        let legends = serde_json::from_str(legends_json)?;
        let events = serde_json::from_str(events_json)?;
        Ok(Self::new(legends, events))
    }

    /// Load a `{"legends": [...], "events": [...]}` document.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        Ok(Self::new(file.legends, file.events))
    }

    pub fn legends(&self) -> &[Legend] {
        &self.legends
    }

    pub fn events(&self) -> &[StaticEvent] {
        &self.events
    }

    pub fn legend(&self, id: &str) -> Option<&Legend> {
        self.positions.get(id).map(|&index| &self.legends[index])
    }

    /// Position of a legend in catalog order.
    pub fn legend_position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn event(&self, id: &str) -> Option<&StaticEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn detroit_founders(&self) -> impl Iterator<Item = &Legend> {
        self.legends.iter().filter(|legend| legend.detroit_founder)
    }

    /// Legend names for `ids`, skipping ids the catalog does not know.
    pub fn legend_names<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        ids.iter()
            .filter_map(|id| self.legend(id))
            .map(|legend| legend.name.as_str())
    }
}
