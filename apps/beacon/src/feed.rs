//! Event feed: which dates to show and in what order.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::{Legend, SortMode, StaticEvent};
use crate::overlap::OverlapIndex;

/// Events of the selected legends, ordered by `mode`.
///
/// [`SortMode::Date`] orders by the ISO date string. [`SortMode::Legend`] groups
/// by the legend's catalog position, dates ascending inside a group. Both sorts
/// are stable, so equal keys keep catalog order.
pub fn events_for_legends<'c>(
    catalog: &'c Catalog,
    selected: &[String],
    mode: SortMode,
) -> Vec<&'c StaticEvent> {
    if selected.is_empty() {
        return Vec::new();
    }

    let wanted: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let mut events: Vec<&StaticEvent> = catalog
        .events()
        .iter()
        .filter(|event| wanted.contains(event.legend_id.as_str()))
        .collect();

    sort_events(catalog, &mut events, mode);
    events
}

/// Reorder `events` in place; legends missing from the catalog sort last.
pub fn sort_events(catalog: &Catalog, events: &mut [&StaticEvent], mode: SortMode) {
    match mode {
        SortMode::Date => events.sort_by(|a, b| a.date.cmp(&b.date)),
        SortMode::Legend => events.sort_by(|a, b| by_legend(catalog, a, b)),
    }
}

fn by_legend(catalog: &Catalog, a: &StaticEvent, b: &StaticEvent) -> Ordering {
    let position = |event: &StaticEvent| {
        catalog
            .legend_position(&event.legend_id)
            .unwrap_or(usize::MAX)
    };
    position(a)
        .cmp(&position(b))
        .then_with(|| a.date.cmp(&b.date))
}

/// Per-view chip filter narrowing the feed to a subset of the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilter {
    chips: Vec<String>,
}

impl FeedFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the chips from the current selection, as the feed does on open.
    pub fn from_selection(selected: &[String]) -> Self {
        Self {
            chips: selected.to_vec(),
        }
    }

    pub fn toggle(&mut self, legend_id: &str) {
        if let Some(index) = self.chips.iter().position(|id| id == legend_id) {
            self.chips.remove(index);
        } else {
            self.chips.push(legend_id.to_string());
        }
    }

    /// Whether the chip for `legend_id` renders as active.
    pub fn is_active(&self, legend_id: &str) -> bool {
        self.chips.is_empty() || self.chips.iter().any(|id| id == legend_id)
    }

    /// Chips that are still globally selected, in chip order; the whole
    /// selection when none are.
    pub fn display_ids(&self, selected: &[String]) -> Vec<String> {
        let active: Vec<String> = self
            .chips
            .iter()
            .filter(|id| selected.contains(id))
            .cloned()
            .collect();

        if active.is_empty() {
            selected.to_vec()
        } else {
            active
        }
    }
}

/// One rendered feed row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry<'a> {
    pub event: &'a StaticEvent,
    pub legend: &'a Legend,
    /// Legend ids sharing the date and city, own legend included
    pub overlap: Option<&'a [String]>,
    /// Names of the other legends in the overlap group
    pub also_playing: Vec<&'a str>,
    pub on_radar: bool,
}

impl FeedEntry<'_> {
    pub fn is_overlap(&self) -> bool {
        matches!(self.overlap, Some(legends) if legends.len() > 1)
    }
}

/// Join events with their legend, overlap group and radar flag. Events whose
/// legend is unknown are skipped.
pub fn build_entries<'a>(
    catalog: &'a Catalog,
    events: &[&'a StaticEvent],
    overlaps: &'a OverlapIndex,
    on_radar: impl Fn(&str) -> bool,
) -> Vec<FeedEntry<'a>> {
    events
        .iter()
        .filter_map(|&event| {
            let legend = catalog.legend(&event.legend_id)?;
            let also_playing = overlaps
                .also_playing(event)
                .filter_map(|id| catalog.legend(id))
                .map(|legend| legend.name.as_str())
                .collect();

            Some(FeedEntry {
                event,
                legend,
                overlap: overlaps.get(&event.id),
                also_playing,
                on_radar: on_radar(&event.id),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{event, legend};
    use crate::catalog::CatalogError;
    use crate::overlap::detect_overlaps;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|id| (*id).to_string()).collect()
    }

    fn small_catalog() -> Catalog {
        Catalog::new(
            vec![
                legend("x", "X", false),
                legend("y", "Y", true),
                legend("z", "Z", false),
            ],
            vec![
                event("y-0", "y", "Berlin", "2026-05-01"),
                event("x-0", "x", "Paris", "2026-04-01"),
                event("z-0", "z", "Lyon", "2026-01-01"),
                event("y-1", "y", "Berlin", "2026-02-01"),
                event("x-1", "x", "berlin", "2026-05-01"),
            ],
        )
    }

    fn event_ids(events: &[&StaticEvent]) -> Vec<String> {
        events.iter().map(|event| event.id.clone()).collect()
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let catalog = small_catalog();
        assert!(events_for_legends(&catalog, &[], SortMode::Date).is_empty());
        assert!(events_for_legends(&catalog, &[], SortMode::Legend).is_empty());
    }

    #[test]
    fn filters_to_selected_and_sorts_by_date() {
        let catalog = small_catalog();
        let events = events_for_legends(&catalog, &ids(&["y", "x"]), SortMode::Date);

        assert_eq!(event_ids(&events), ids(&["y-1", "x-0", "y-0", "x-1"]));
        assert!(events.windows(2).all(|pair| pair[0].date <= pair[1].date));
    }

    #[test]
    fn legend_sort_groups_in_catalog_order() {
        let catalog = small_catalog();
        let events = events_for_legends(&catalog, &ids(&["z", "y", "x"]), SortMode::Legend);

        assert_eq!(
            event_ids(&events),
            ids(&["x-0", "x-1", "y-1", "y-0", "z-0"])
        );
    }

    #[test]
    fn selection_order_does_not_matter() {
        let catalog = small_catalog();
        let forward = events_for_legends(&catalog, &ids(&["x", "y"]), SortMode::Date);
        let backward = events_for_legends(&catalog, &ids(&["y", "x"]), SortMode::Date);
        assert_eq!(event_ids(&forward), event_ids(&backward));
    }

    #[test]
    fn unknown_ids_in_selection_are_ignored() {
        let catalog = small_catalog();
        let events = events_for_legends(&catalog, &ids(&["nobody", "z"]), SortMode::Date);
        assert_eq!(event_ids(&events), ids(&["z-0"]));
    }

    #[test]
    fn builtin_legend_sort_is_contiguous() -> Result<(), CatalogError> {
        let catalog = Catalog::builtin()?;
        let selected = ids(&["robert-hood", "jeff-mills", "dave-clarke"]);
        let events = events_for_legends(&catalog, &selected, SortMode::Legend);

        let mut groups: Vec<&str> = events.iter().map(|e| e.legend_id.as_str()).collect();
        groups.dedup();
        assert_eq!(groups, ["jeff-mills", "dave-clarke", "robert-hood"]);
        assert_eq!(events.len(), 16 + 4 + 3);
        assert!(events.windows(2).all(|pair| {
            pair[0].legend_id != pair[1].legend_id || pair[0].date <= pair[1].date
        }));
        Ok(())
    }

    #[test]
    fn chip_filter_narrows_to_intersection() {
        let selected = ids(&["x", "y", "z"]);
        let mut filter = FeedFilter::new();
        assert_eq!(filter.display_ids(&selected), selected);
        assert!(filter.is_active("y"));

        filter.toggle("z");
        filter.toggle("x");
        assert_eq!(filter.display_ids(&selected), ids(&["z", "x"]));
        assert!(!filter.is_active("y"));

        filter.toggle("z");
        assert_eq!(filter.display_ids(&selected), ids(&["x"]));
    }

    #[test]
    fn chips_outside_selection_fall_back_to_selection() {
        let mut filter = FeedFilter::from_selection(&ids(&["x"]));
        filter.toggle("gone");
        let selected = ids(&["y"]);
        assert_eq!(filter.display_ids(&selected), selected);
    }

    #[test]
    fn entries_carry_overlap_names_and_radar_flag() {
        let catalog = small_catalog();
        let events = events_for_legends(&catalog, &ids(&["x", "y"]), SortMode::Date);
        let overlaps = detect_overlaps(&events);

        let entries = build_entries(&catalog, &events, &overlaps, |id| id == "x-1");
        let x1 = entries
            .iter()
            .find(|entry| entry.event.id == "x-1")
            .map(|entry| (entry.is_overlap(), entry.also_playing.clone(), entry.on_radar));
        assert_eq!(x1, Some((true, vec!["Y"], true)));

        let x0 = entries.iter().find(|entry| entry.event.id == "x-0");
        assert!(x0.is_some_and(|entry| !entry.is_overlap() && entry.also_playing.is_empty()));
    }
}
