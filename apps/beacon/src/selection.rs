use log::debug;

use crate::catalog::Catalog;
use crate::storage::{persist_json, read_json_or, KeyValueStore, StorageKey};

/// The legends a user has chosen to follow.
///
/// Insertion-ordered and duplicate-free; every change is written through to
/// the store immediately.
#[derive(Debug)]
pub struct SelectedLegends<S> {
    store: S,
    ids: Vec<String>,
}

impl<S: KeyValueStore> SelectedLegends<S> {
    pub fn load(store: S) -> Self {
        let stored: Vec<String> = read_json_or(&store, StorageKey::SelectedLegends, Vec::new);
        let mut ids = Vec::with_capacity(stored.len());
        for id in stored {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self { store, ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, legend_id: &str) -> bool {
        self.ids.iter().any(|id| id == legend_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add the legend if absent, remove it if present. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&mut self, legend_id: &str) -> bool {
        let selected = if let Some(index) = self.ids.iter().position(|id| id == legend_id) {
            self.ids.remove(index);
            false
        } else {
            self.ids.push(legend_id.to_string());
            true
        };
        debug!("legend {legend_id} selected: {selected}");
        self.persist();
        selected
    }

    /// Select every Detroit founder, or clear them all when every one is
    /// already selected. Returns whether the founders are selected afterwards.
    pub fn toggle_detroit_founders(&mut self, catalog: &Catalog) -> bool {
        let founders: Vec<&str> = catalog
            .detroit_founders()
            .map(|legend| legend.id.as_str())
            .collect();
        let all_selected = founders.iter().all(|id| self.contains(id));

        if all_selected {
            self.ids.retain(|id| !founders.contains(&id.as_str()));
        } else {
            for id in founders {
                if !self.contains(id) {
                    self.ids.push(id.to_string());
                }
            }
        }
        self.persist();
        !all_selected
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.persist();
    }

    fn persist(&self) {
        persist_json(&self.store, StorageKey::SelectedLegends, &self.ids);
    }
}
