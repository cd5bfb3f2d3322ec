//! Trip planning links for a saved or browsed event.
//!
//! Nothing here talks to the travel sites; it only fills their search URL
//! templates with the home city, the destination and the dates around the show.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::{Legend, StaticEvent};
use crate::home_city::{HomeCityStore, DEFAULT_HOME_CITY};
use crate::storage::KeyValueStore;

const ISO_DATE: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOption {
    pub label: String,
    pub date: String,
    pub google_flights: String,
    pub skyscanner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItineraryStep {
    pub day: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub event_id: String,
    pub home_city: String,
    pub destination: String,
    pub day_before: String,
    pub event_date: String,
    pub day_after: String,
    pub flights: Vec<FlightOption>,
    pub hotel: HotelLink,
    pub cost_estimate: &'static str,
    pub itinerary: Vec<ItineraryStep>,
}

impl TripPlan {
    pub fn new(event: &StaticEvent, legend: Option<&Legend>, home_city: &str) -> Self {
        let day_before = shift_date(&event.date, -1);
        let day_after = shift_date(&event.date, 1);

        let flights = [
            (format!("Fly out ({day_before})"), day_before.clone()),
            (format!("Event day ({})", event.date), event.date.clone()),
            (format!("Return ({day_after})"), day_after.clone()),
        ]
        .into_iter()
        .map(|(label, date)| FlightOption {
            google_flights: google_flights_url(home_city, &event.city, &date),
            skyscanner: skyscanner_url(home_city, &event.city, &date),
            label,
            date,
        })
        .collect();

        let hotel = HotelLink {
            label: format!("Hotels near {}, {}", event.venue, event.city),
            url: booking_url(&event.city, &event.date, &day_after),
        };

        let itinerary = vec![
            ItineraryStep {
                day: format_date(&day_before),
                action: format!("Fly out from {home_city} · Hotel check-in"),
            },
            ItineraryStep {
                day: format_date(&event.date),
                action: format!("{} · {}", event.venue, event.display_title(legend)),
            },
            ItineraryStep {
                day: format_date(&day_after),
                action: "Fly home · Debrief".to_string(),
            },
        ];

        Self {
            event_id: event.id.clone(),
            home_city: home_city.to_string(),
            destination: event.city.clone(),
            day_before,
            event_date: event.date.clone(),
            day_after,
            flights,
            hotel,
            cost_estimate: cost_estimate(&event.city, &event.country),
            itinerary,
        }
    }
}

/// Planner session bound to the persisted home city.
///
/// A caller-supplied default other than the stock one wins for the session;
/// otherwise the stored value is used. Edits are written back to the store.
#[derive(Debug)]
pub struct TripPlanner<'h, S> {
    home: &'h HomeCityStore<S>,
    home_city: String,
}

impl<'h, S: KeyValueStore> TripPlanner<'h, S> {
    pub fn open(home: &'h HomeCityStore<S>, caller_default: Option<&str>) -> Self {
        let home_city = match caller_default {
            Some(city) if !city.is_empty() && city != DEFAULT_HOME_CITY => city.to_string(),
            _ => home.read(),
        };
        Self { home, home_city }
    }

    pub fn home_city(&self) -> &str {
        &self.home_city
    }

    pub fn set_home_city(&mut self, city: &str) {
        city.clone_into(&mut self.home_city);
        self.home.write(city);
    }

    pub fn plan(&self, event: &StaticEvent, legend: Option<&Legend>) -> TripPlan {
        TripPlan::new(event, legend, &self.home_city)
    }
}

/// `date` moved by `days`; the input unchanged when it is not an ISO date.
pub fn shift_date(date: &str, days: i64) -> String {
    NaiveDate::parse_from_str(date, ISO_DATE)
        .ok()
        .and_then(|parsed| parsed.checked_add_signed(Duration::days(days)))
        .map_or_else(|| date.to_string(), |shifted| shifted.format(ISO_DATE).to_string())
}

/// `"Sat 14 Mar 2026"`; the input unchanged when it is not an ISO date.
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, ISO_DATE).map_or_else(
        |_| date.to_string(),
        |parsed| parsed.format("%a %-d %b %Y").to_string(),
    )
}

pub fn google_flights_url(home_city: &str, destination: &str, date: &str) -> String {
    format!(
        "https://www.google.com/travel/flights?q=flights+from+{}+to+{}+on+{date}",
        urlencoding::encode(home_city),
        urlencoding::encode(destination),
    )
}

pub fn skyscanner_url(home_city: &str, destination: &str, date: &str) -> String {
    let from = urlencoding::encode(&city_slug(home_city, true)).into_owned();
    let to = urlencoding::encode(&city_slug(destination, false)).into_owned();
    let yymmdd: String = date.chars().skip(2).filter(|c| *c != '-').collect();
    format!("https://www.skyscanner.net/transport/flights/{from}/{to}/{yymmdd}/")
}

pub fn booking_url(city: &str, check_in: &str, check_out: &str) -> String {
    format!(
        "https://www.booking.com/searchresults.html?ss={}&checkin={check_in}&checkout={check_out}",
        urlencoding::encode(city),
    )
}

/// Lowercase, whitespace runs to `-`; with `split_commas`, a comma and the
/// whitespace after it also become one `-`.
fn city_slug(city: &str, split_commas: bool) -> String {
    let lower = city.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut chars = lower.chars().peekable();
    while let Some(c) = chars.next() {
        if (split_commas && c == ',') || c.is_whitespace() {
            slug.push('-');
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
        } else {
            slug.push(c);
        }
    }
    slug
}

const NORTH_AMERICA: &[&str] = &[
    "usa",
    "canada",
    "new york",
    "chicago",
    "los angeles",
    "miami",
    "toronto",
    "montreal",
    "san francisco",
    "washington",
    "detroit",
];
const SOUTH_AFRICA: &[&str] = &["south africa", "johannesburg", "cape town"];
const LATIN_AMERICA: &[&str] = &["brazil", "colombia", "sao paulo", "bogota", "medellin"];
const UK: &[&str] = &["uk", "london", "brighton", "cardiff", "edinburgh"];
const EUROPE: &[&str] = &[
    "germany",
    "amsterdam",
    "netherlands",
    "paris",
    "france",
    "belgium",
    "brussels",
    "spain",
    "sevilla",
    "luxembourg",
    "mannheim",
    "munich",
    "berlin",
    "ostend",
    "lyon",
    "strasbourg",
    "iceland",
];

/// Rough flights-plus-hotel bracket from the UK.
pub fn cost_estimate(city: &str, country: &str) -> &'static str {
    let place = format!("{city} {country}").to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|needle| place.contains(needle));

    if mentions(NORTH_AMERICA) {
        "~£500–900 from UK"
    } else if mentions(SOUTH_AFRICA) {
        "~£600–1,000 from UK"
    } else if mentions(LATIN_AMERICA) {
        "~£700–1,200 from UK"
    } else if mentions(UK) {
        "~£50–200 within UK"
    } else if mentions(EUROPE) {
        "~£200–500 from UK"
    } else if place.contains("malta") {
        "~£200–450 from UK"
    } else {
        "~£300–800 from UK"
    }
}
