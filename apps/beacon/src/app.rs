//! One browsing context's worth of state.
//!
//! A [`Beacon`] owns the selection, radar and home-city stores of a single
//! context over a shared catalog. Several instances may sit on one substrate;
//! only the home city is kept in sync between them.

use std::collections::HashSet;
use std::rc::Rc;

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::domain::{SortMode, StaticEvent};
use crate::feed::{build_entries, events_for_legends, sort_events, FeedEntry, FeedFilter};
use crate::home_city::HomeCityStore;
use crate::overlap::{detect_overlaps, OverlapIndex};
use crate::radar::RadarStore;
use crate::selection::SelectedLegends;
use crate::storage::{ContextStorage, KeyValueStore, StorageEvents};
use crate::trip::{TripPlan, TripPlanner};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BeaconError {
    #[error("unknown legend: {0}")]
    UnknownLegend(String),

    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

#[derive(Debug)]
pub struct Beacon<S> {
    catalog: Rc<Catalog>,
    selection: SelectedLegends<S>,
    radar: RadarStore<S>,
    home: HomeCityStore<S>,
}

impl<S: KeyValueStore + Clone> Beacon<S> {
    pub fn load(catalog: Rc<Catalog>, store: S) -> Self {
        Self {
            catalog,
            selection: SelectedLegends::load(store.clone()),
            radar: RadarStore::load(store.clone()),
            home: HomeCityStore::load(store),
        }
    }
}

impl<S: KeyValueStore + Clone + 'static> Beacon<ContextStorage<S>> {
    /// Open a new context on `substrate` and start following home-city edits
    /// made by the other contexts on `events`.
    pub fn open_context(catalog: Rc<Catalog>, substrate: S, events: &StorageEvents) -> Self {
        Self::open_context_with(catalog, substrate, events, |_| {})
    }

    /// As [`Beacon::open_context`], also calling `on_home_city` with each
    /// value another context writes.
    pub fn open_context_with(
        catalog: Rc<Catalog>,
        substrate: S,
        events: &StorageEvents,
        on_home_city: impl Fn(&str) + 'static,
    ) -> Self {
        let storage = ContextStorage::new(substrate, events);
        let context = storage.context();
        let mut beacon = Self::load(catalog, storage);
        beacon.home.watch(events, context, move |city| {
            debug!("context {context:?} now travelling from {city}");
            on_home_city(city);
        });
        beacon
    }
}

impl<S: KeyValueStore> Beacon<S> {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn selection(&self) -> &SelectedLegends<S> {
        &self.selection
    }

    pub const fn radar(&self) -> &RadarStore<S> {
        &self.radar
    }

    pub const fn home_city(&self) -> &HomeCityStore<S> {
        &self.home
    }

    pub fn home_city_mut(&mut self) -> &mut HomeCityStore<S> {
        &mut self.home
    }

    /// Toggle a catalog legend. Returns whether it is selected afterwards.
    pub fn toggle_legend(&mut self, legend_id: &str) -> Result<bool, BeaconError> {
        if self.catalog.legend(legend_id).is_none() {
            return Err(BeaconError::UnknownLegend(legend_id.to_string()));
        }
        Ok(self.selection.toggle(legend_id))
    }

    pub fn toggle_detroit_founders(&mut self) -> bool {
        self.selection.toggle_detroit_founders(&self.catalog)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The feed for the current selection narrowed by `filter`.
    pub fn feed(&self, mode: SortMode, filter: &FeedFilter) -> Feed<'_> {
        let legend_ids = filter.display_ids(self.selection.ids());
        // overlap groups keep date order whatever the display sort
        let mut events = events_for_legends(&self.catalog, &legend_ids, SortMode::Date);
        let overlaps = detect_overlaps(&events);
        sort_events(&self.catalog, &mut events, mode);
        let radar_ids = self
            .radar
            .events()
            .iter()
            .map(|event| event.id.clone())
            .collect();

        Feed {
            catalog: &self.catalog,
            legend_ids,
            events,
            overlaps,
            radar_ids,
        }
    }

    /// Save or unsave a catalog event. Returns whether it is saved afterwards.
    pub fn toggle_radar(&mut self, event_id: &str) -> Result<bool, BeaconError> {
        let event = lookup_event(&self.catalog, event_id)?;
        Ok(self.radar.toggle(event))
    }

    pub fn add_to_radar(&mut self, event_id: &str) -> Result<bool, BeaconError> {
        let event = lookup_event(&self.catalog, event_id)?.clone();
        Ok(self.radar.add(event))
    }

    /// Unsave by id. Saved snapshots no longer in the catalog can still be removed.
    pub fn remove_from_radar(&mut self, event_id: &str) -> bool {
        self.radar.remove(event_id)
    }

    /// Trip links for a catalog or saved event, travelling from `from` when
    /// given and otherwise from this context's home city.
    pub fn plan_trip(&self, event_id: &str, from: Option<&str>) -> Result<TripPlan, BeaconError> {
        let event = self
            .catalog
            .event(event_id)
            .or_else(|| self.radar.events().iter().find(|event| event.id == event_id))
            .ok_or_else(|| BeaconError::UnknownEvent(event_id.to_string()))?;

        let current = self.home.current();
        let planner = TripPlanner::open(&self.home, Some(from.unwrap_or(&current)));
        Ok(planner.plan(event, self.catalog.legend(&event.legend_id)))
    }

    pub fn stats(&self) -> BeaconStats {
        let feed = self.feed(SortMode::Date, &FeedFilter::new());
        let selected_legends = self
            .catalog
            .legend_names(self.selection.ids())
            .map(str::to_string)
            .collect();

        BeaconStats {
            selected_legends,
            feed_events: feed.len(),
            overlapping_events: feed.overlaps().len(),
            radar_events: self.radar.len(),
            next_on_radar: self.radar.events().first().map(|event| RadarHeadline {
                id: event.id.clone(),
                date: event.date.clone(),
                city: event.city.clone(),
            }),
            home_city: self.home.current(),
        }
    }
}

fn lookup_event<'c>(catalog: &'c Catalog, event_id: &str) -> Result<&'c StaticEvent, BeaconError> {
    catalog
        .event(event_id)
        .ok_or_else(|| BeaconError::UnknownEvent(event_id.to_string()))
}

/// A computed feed: the displayed events and their overlap groups.
#[derive(Debug)]
pub struct Feed<'c> {
    catalog: &'c Catalog,
    legend_ids: Vec<String>,
    events: Vec<&'c StaticEvent>,
    overlaps: OverlapIndex,
    radar_ids: HashSet<String>,
}

impl<'c> Feed<'c> {
    /// Legends the feed was built from, after the chip filter.
    pub fn legend_ids(&self) -> &[String] {
        &self.legend_ids
    }

    pub fn events(&self) -> &[&'c StaticEvent] {
        &self.events
    }

    pub const fn overlaps(&self) -> &OverlapIndex {
        &self.overlaps
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn entries(&self) -> Vec<FeedEntry<'_>> {
        build_entries(self.catalog, &self.events, &self.overlaps, |id| {
            self.radar_ids.contains(id)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadarHeadline {
    pub id: String,
    pub date: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeaconStats {
    pub selected_legends: Vec<String>,
    pub feed_events: usize,
    pub overlapping_events: usize,
    pub radar_events: usize,
    pub next_on_radar: Option<RadarHeadline>,
    pub home_city: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Namespaced, DEFAULT_NAMESPACE};

    fn beacon(store: &MemoryStore) -> Result<Beacon<&MemoryStore>, Box<dyn std::error::Error>> {
        Ok(Beacon::load(Rc::new(Catalog::builtin()?), store))
    }

    #[test]
    fn unknown_ids_leave_state_alone() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let mut app = beacon(&store)?;

        assert_eq!(
            app.toggle_legend("daft-punk"),
            Err(BeaconError::UnknownLegend("daft-punk".to_string()))
        );
        assert!(matches!(
            app.toggle_radar("nope-0"),
            Err(BeaconError::UnknownEvent(_))
        ));
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn feed_flags_builtin_overlap() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let mut app = beacon(&store)?;
        app.toggle_legend("richie-hawtin")?;
        app.toggle_legend("jeff-mills")?;
        app.toggle_radar("jeff-mills-2")?;

        let feed = app.feed(SortMode::Date, &FeedFilter::new());
        assert_eq!(feed.len(), 16 + 12);

        let entries = feed.entries();
        let jeff = entries.iter().find(|entry| entry.event.id == "jeff-mills-2");
        assert!(jeff.is_some_and(|entry| {
            entry.is_overlap() && entry.on_radar && entry.also_playing == ["Richie Hawtin"]
        }));
        Ok(())
    }

    #[test]
    fn legend_sort_keeps_overlap_groups_in_date_order() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let mut app = beacon(&store)?;
        app.toggle_legend("richie-hawtin")?;
        app.toggle_legend("jeff-mills")?;

        let by_date = app.feed(SortMode::Date, &FeedFilter::new());
        let by_legend = app.feed(SortMode::Legend, &FeedFilter::new());
        let expected = ["richie-hawtin".to_string(), "jeff-mills".to_string()];

        assert_eq!(by_date.overlaps().get("richie-hawtin-0"), Some(&expected[..]));
        assert_eq!(by_legend.overlaps().get("richie-hawtin-0"), Some(&expected[..]));
        assert_eq!(by_legend.events()[0].legend_id, "jeff-mills");
        Ok(())
    }

    #[test]
    fn chip_filter_hides_other_half_of_overlap() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let mut app = beacon(&store)?;
        app.toggle_legend("richie-hawtin")?;
        app.toggle_legend("jeff-mills")?;

        let mut filter = FeedFilter::new();
        filter.toggle("jeff-mills");
        let feed = app.feed(SortMode::Legend, &filter);

        assert_eq!(feed.legend_ids(), ["jeff-mills"]);
        assert_eq!(feed.len(), 16);
        assert!(!feed.overlaps().contains("jeff-mills-2"));
        Ok(())
    }

    #[test]
    fn trip_uses_override_then_home_city() -> Result<(), Box<dyn std::error::Error>> {
        let store = MemoryStore::new();
        let app = beacon(&store)?;
        app.home_city().write("Glasgow, UK");

        let plan = app.plan_trip("kevin-saunderson-0", None)?;
        assert_eq!(plan.home_city, "Glasgow, UK");
        assert_eq!(plan.destination, "Medellin");

        let plan = app.plan_trip("kevin-saunderson-0", Some("Leeds, UK"))?;
        assert_eq!(plan.home_city, "Leeds, UK");
        assert_eq!(app.home_city().read(), "Glasgow, UK");
        Ok(())
    }

    #[test]
    fn stats_summarise_context() -> Result<(), Box<dyn std::error::Error>> {
        let store = Namespaced::new(MemoryStore::new(), DEFAULT_NAMESPACE);
        let mut app = Beacon::load(Rc::new(Catalog::builtin()?), &store);
        app.toggle_legend("kevin-saunderson")?;
        app.toggle_legend("robert-hood")?;
        app.add_to_radar("robert-hood-2")?;

        let stats = app.stats();
        assert_eq!(stats.selected_legends, ["Kevin Saunderson", "Robert Hood"]);
        assert_eq!(stats.feed_events, 6);
        assert_eq!(stats.overlapping_events, 2);
        assert_eq!(stats.radar_events, 1);
        assert_eq!(
            stats.next_on_radar.map(|headline| headline.id),
            Some("robert-hood-2".to_string())
        );
        assert_eq!(stats.home_city, "London, UK");
        assert!(store
            .inner()
            .read("techno-beacon-radar-events")?
            .is_some());
        Ok(())
    }
}
