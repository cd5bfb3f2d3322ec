//! Several contexts on one substrate, the way tabs share localStorage.

use std::cell::RefCell;
use std::rc::Rc;

use techno_beacon::feed::FeedFilter;
use techno_beacon::storage::{FileStore, MemoryStore, Namespaced, DEFAULT_NAMESPACE};
use techno_beacon::{Beacon, Catalog, SortMode, StorageEvents};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn catalog() -> Result<Rc<Catalog>, Box<dyn std::error::Error>> {
    Ok(Rc::new(Catalog::builtin()?))
}

#[test]
fn home_city_edit_reaches_the_other_tab() -> TestResult {
    let catalog = catalog()?;
    let events = StorageEvents::new();
    let substrate = Rc::new(MemoryStore::new());

    let tab_a = Beacon::open_context(Rc::clone(&catalog), Rc::clone(&substrate), &events);
    let notified = Rc::new(RefCell::new(Vec::new()));
    let tab_b = Beacon::open_context_with(Rc::clone(&catalog), Rc::clone(&substrate), &events, {
        let notified = Rc::clone(&notified);
        move |city: &str| notified.borrow_mut().push(city.to_string())
    });

    tab_a.home_city().write("Berlin, Germany");

    assert_eq!(tab_b.home_city().current(), "Berlin, Germany");
    assert_eq!(*notified.borrow(), ["Berlin, Germany"]);
    assert_eq!(
        tab_b.stats().home_city,
        "Berlin, Germany",
        "stats read the synced value"
    );
    Ok(())
}

#[test]
fn radar_diverges_until_reload_and_last_write_wins() -> TestResult {
    let catalog = catalog()?;
    let events = StorageEvents::new();
    let substrate = Rc::new(MemoryStore::new());

    let mut tab_a = Beacon::open_context(Rc::clone(&catalog), Rc::clone(&substrate), &events);
    let mut tab_b = Beacon::open_context(Rc::clone(&catalog), Rc::clone(&substrate), &events);

    tab_a.add_to_radar("jeff-mills-2")?;
    assert!(!tab_b.radar().contains("jeff-mills-2"));

    tab_b.add_to_radar("robert-hood-2")?;

    let reloaded = Beacon::open_context(Rc::clone(&catalog), Rc::clone(&substrate), &events);
    let ids: Vec<&str> = reloaded
        .radar()
        .events()
        .iter()
        .map(|event| event.id.as_str())
        .collect();
    assert_eq!(ids, ["robert-hood-2"]);
    Ok(())
}

#[test]
fn selection_and_radar_survive_restart_on_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("store.json");
    let catalog = catalog()?;

    {
        let store = Namespaced::new(Rc::new(FileStore::open(&path)?), DEFAULT_NAMESPACE);
        let mut beacon = Beacon::load(Rc::clone(&catalog), store);
        beacon.toggle_legend("kevin-saunderson")?;
        beacon.toggle_legend("robert-hood")?;
        beacon.add_to_radar("kevin-saunderson-0")?;
        beacon.home_city().write("Manchester, UK");
    }

    let raw = FileStore::new(&path);
    let document = raw.snapshot()?;
    assert!(document.contains_key("techno-beacon-selected-legends"));
    assert!(document.contains_key("techno-beacon-radar-events"));
    assert_eq!(
        document.get("techno-beacon-home-city").map(String::as_str),
        Some("Manchester, UK")
    );

    let store = Namespaced::new(Rc::new(raw), DEFAULT_NAMESPACE);
    let beacon = Beacon::load(catalog, store);
    assert_eq!(
        beacon.selection().ids(),
        ["kevin-saunderson", "robert-hood"]
    );

    let feed = beacon.feed(SortMode::Legend, &FeedFilter::new());
    assert_eq!(feed.len(), 6);
    assert!(feed.overlaps().contains("kevin-saunderson-0"));
    assert!(feed.overlaps().contains("robert-hood-2"));

    let entries = feed.entries();
    assert!(entries
        .iter()
        .any(|entry| entry.event.id == "kevin-saunderson-0" && entry.on_radar));
    Ok(())
}

#[test]
fn trip_plan_reads_home_city_from_storage() -> TestResult {
    let catalog = catalog()?;
    let events = StorageEvents::new();
    let substrate = Rc::new(MemoryStore::new());

    let settings = Beacon::open_context(Rc::clone(&catalog), Rc::clone(&substrate), &events);
    let feed_tab = Beacon::open_context(Rc::clone(&catalog), Rc::clone(&substrate), &events);
    settings.home_city().write("Paris, France");

    let plan = feed_tab.plan_trip("richie-hawtin-0", None)?;
    assert_eq!(plan.home_city, "Paris, France");
    assert!(plan.flights[0]
        .google_flights
        .contains("flights+from+Paris%2C%20France+to+"));
    assert_eq!(plan.cost_estimate, "~£500–900 from UK");
    Ok(())
}
