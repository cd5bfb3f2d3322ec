use std::rc::Rc;
use std::time::Duration;

use color_eyre::Result;
use log::{debug, warn};
use techno_beacon::feed::FeedFilter;
use techno_beacon::storage::{ContextStorage, KeyValueStore};
use techno_beacon::trip::format_date;
use techno_beacon::{Beacon, Catalog, SortMode, StorageEvents};

use crate::cli::{Command, RadarCommand};
use crate::watch::poll_home_city;

/// Run one command in a fresh context on `substrate`.
pub async fn run<S>(
    command: Command,
    catalog: Rc<Catalog>,
    substrate: S,
    events: &StorageEvents,
) -> Result<()>
where
    S: KeyValueStore + Clone + 'static,
{
    let mut beacon = match command {
        Command::Watch { interval_ms } => {
            return watch(catalog, substrate, events, interval_ms).await;
        }
        _ => Beacon::open_context(catalog, substrate, events),
    };

    match command {
        Command::Legends { search, json } => list_legends(&beacon, search.as_deref(), json)?,
        Command::Select { ids, detroit, clear } => select(&mut beacon, &ids, detroit, clear),
        Command::Events { sort, only, json } => list_events(&beacon, sort, &only, json)?,
        Command::Radar { action } => radar(&mut beacon, action)?,
        Command::HomeCity { value } => home_city(&beacon, value.as_deref()),
        Command::Trip {
            event_id,
            from,
            json,
        } => trip(&beacon, &event_id, from.as_deref(), json)?,
        Command::Stats { json } => stats(&beacon, json)?,
        // needs its own context, opened above
        Command::Watch { .. } => {}
    }
    Ok(())
}

fn list_legends<S: KeyValueStore>(
    beacon: &Beacon<S>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let catalog = beacon.catalog();
    let legends = catalog.search_legends(search.unwrap_or_default());

    if json {
        println!("{}", serde_json::to_string_pretty(&legends)?);
        return Ok(());
    }

    for legend in legends {
        let marker = if beacon.selection().contains(&legend.id) {
            "*"
        } else {
            " "
        };
        let detroit = if legend.detroit_founder { " [Detroit]" } else { "" };
        println!(
            "{marker} {:<18} {:<28} {}{detroit}",
            legend.id, legend.name, legend.genre
        );
    }
    Ok(())
}

fn select<S: KeyValueStore>(beacon: &mut Beacon<S>, ids: &[String], detroit: bool, clear: bool) {
    if clear {
        beacon.clear_selection();
        println!("Selection cleared");
        return;
    }
    if detroit {
        let selected = beacon.toggle_detroit_founders();
        println!(
            "Detroit founders {}",
            if selected { "selected" } else { "cleared" }
        );
        return;
    }

    for id in ids {
        match beacon.toggle_legend(id) {
            Ok(true) => println!("+ {id}"),
            Ok(false) => println!("- {id}"),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn list_events<S: KeyValueStore>(
    beacon: &Beacon<S>,
    sort: SortMode,
    only: &[String],
    json: bool,
) -> Result<()> {
    let mut filter = FeedFilter::new();
    for id in only {
        filter.toggle(id);
    }
    let feed = beacon.feed(sort, &filter);
    let entries = feed.entries();
    debug!(
        "feed of {} legends sorted by {}",
        feed.legend_ids().len(),
        sort.as_str()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if feed.legend_ids().is_empty() {
        println!("No legends selected. Try `beacon select --detroit`.");
        return Ok(());
    }

    println!(
        "\n{} dates, sorted by {}",
        entries.len(),
        sort.label()
    );
    for entry in &entries {
        let saved = if entry.on_radar { "★" } else { " " };
        println!(
            "{saved} {} | {:<18} | {}, {} | {} [{}]",
            entry.event.date,
            entry.legend.name,
            entry.event.city,
            entry.event.country,
            entry.event.display_title(Some(entry.legend)),
            entry.event.id
        );
        if entry.is_overlap() && !entry.also_playing.is_empty() {
            println!("    ⚡ Also playing: {}", entry.also_playing.join(", "));
        }
    }
    Ok(())
}

fn radar<S: KeyValueStore>(beacon: &mut Beacon<S>, action: RadarCommand) -> Result<()> {
    match action {
        RadarCommand::List { json } => {
            let saved = beacon.radar().events();
            if json {
                println!("{}", serde_json::to_string_pretty(saved)?);
                return Ok(());
            }
            if saved.is_empty() {
                println!("Radar is empty");
            }
            for event in saved {
                let legend = beacon.catalog().legend(&event.legend_id);
                println!(
                    "- {} | {} | {}, {} [{}]",
                    format_date(&event.date),
                    event.display_title(legend),
                    event.venue,
                    event.city,
                    event.id
                );
            }
        }
        RadarCommand::Add { event_id } => match beacon.add_to_radar(&event_id) {
            Ok(true) => println!("Saved {event_id}"),
            Ok(false) => println!("{event_id} is already on the radar"),
            Err(e) => eprintln!("{e}"),
        },
        RadarCommand::Remove { event_id } => {
            if beacon.remove_from_radar(&event_id) {
                println!("Removed {event_id}");
            } else {
                eprintln!("{event_id} is not on the radar");
            }
        }
    }
    Ok(())
}

fn home_city<S: KeyValueStore>(beacon: &Beacon<S>, value: Option<&str>) {
    if let Some(city) = value {
        beacon.home_city().write(city);
    }
    println!("{}", beacon.home_city().current());
}

fn trip<S: KeyValueStore>(
    beacon: &Beacon<S>,
    event_id: &str,
    from: Option<&str>,
    json: bool,
) -> Result<()> {
    let plan = match beacon.plan_trip(event_id, from) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{e}");
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("\nTrip to {} from {}", plan.destination, plan.home_city);
    println!("=================");
    for flight in &plan.flights {
        println!("{}", flight.label);
        println!("  Google Flights: {}", flight.google_flights);
        println!("  Skyscanner:     {}", flight.skyscanner);
    }
    println!("\n{}", plan.hotel.label);
    println!("  {}", plan.hotel.url);
    println!("\nEstimated cost: {}", plan.cost_estimate);
    println!("\nItinerary:");
    for step in &plan.itinerary {
        println!("- {} | {}", step.day, step.action);
    }
    Ok(())
}

fn stats<S: KeyValueStore>(beacon: &Beacon<S>, json: bool) -> Result<()> {
    let stats = beacon.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("\nBeacon Stats");
    println!("=================");
    println!("Home city: {}", stats.home_city);
    println!("Legends followed: {}", stats.selected_legends.len());
    for name in &stats.selected_legends {
        println!("- {name}");
    }
    println!("Upcoming dates: {}", stats.feed_events);
    println!("Overlapping dates: {}", stats.overlapping_events);
    println!("Saved on radar: {}", stats.radar_events);
    if let Some(next) = stats.next_on_radar {
        println!("Next up: {} in {} ({})", next.date, next.city, next.id);
    }
    Ok(())
}

async fn watch<S>(
    catalog: Rc<Catalog>,
    substrate: S,
    events: &StorageEvents,
    interval_ms: u64,
) -> Result<()>
where
    S: KeyValueStore + Clone + 'static,
{
    let beacon: Beacon<ContextStorage<S>> =
        Beacon::open_context_with(catalog, substrate.clone(), events, |city| {
            println!("Home city is now {city}");
        });
    println!(
        "Watching home city ({}), Ctrl-C to stop",
        beacon.home_city().current()
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("ctrl-c handler failed: {e}");
        }
    };
    let changes =
        poll_home_city(&substrate, events, Duration::from_millis(interval_ms), shutdown).await;
    debug!("watch stopped after {changes} changes");
    Ok(())
}
