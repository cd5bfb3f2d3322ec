mod logger;
mod storage;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ratzilla::event::KeyCode;
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span, Text},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, Tabs, Wrap,
    },
    Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use techno_beacon::feed::FeedFilter;
use techno_beacon::home_city::HomeCityStore;
use techno_beacon::storage::{
    ContextStorage, KeyValueStore, MemoryStore, Namespaced, DEFAULT_NAMESPACE,
};
use techno_beacon::trip::{format_date, TripPlan, TripPlanner};
use techno_beacon::{Beacon, Catalog, Legend, SortMode, StaticEvent, StorageEvents};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Request, RequestInit, RequestMode, Response};

use storage::{LocalStorage, StorageEventListener};

type Substrate = Namespaced<Rc<dyn KeyValueStore>>;
type TabStorage = ContextStorage<Substrate>;

const CATALOG_URL: &str = "catalog.json";
const ACCENT: Color = Color::Rgb(0, 0, 238);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Legends,
    Events,
    Radar,
    Trip,
}

impl Tab {
    const ALL: [Self; 4] = [Self::Legends, Self::Events, Self::Radar, Self::Trip];

    const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Legends),
            1 => Some(Self::Events),
            2 => Some(Self::Radar),
            3 => Some(Self::Trip),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Legends => 0,
            Self::Events => 1,
            Self::Radar => 2,
            Self::Trip => 3,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Legends => "Legends",
            Self::Events => "Events",
            Self::Radar => "Radar",
            Self::Trip => "Trip",
        }
    }

    const fn next(self) -> Self {
        match Self::from_index((self.index() + 1) % Self::ALL.len()) {
            Some(tab) => tab,
            None => Self::Legends,
        }
    }

    const fn previous(self) -> Self {
        match Self::from_index((self.index() + Self::ALL.len() - 1) % Self::ALL.len()) {
            Some(tab) => tab,
            None => Self::Legends,
        }
    }
}

#[derive(serde::Deserialize)]
struct CatalogDocument {
    legends: Vec<Legend>,
    events: Vec<StaticEvent>,
}

struct Dashboard {
    storage: TabStorage,
    events: StorageEvents,
    beacon: Beacon<TabStorage>,
    /// The trip tab's own view of the home city, like a separate settings page
    settings: HomeCityStore<TabStorage>,
    catalog_source: &'static str,
    today: String,
    tab: Tab,
    row: usize,
    sort: SortMode,
    filter: FeedFilter,
    trip_event: Option<String>,
    trip_from: String,
    draft: String,
    _listener: Option<StorageEventListener>,
}

impl Dashboard {
    fn new(catalog: Rc<Catalog>) -> Self {
        let events = StorageEvents::new();
        let (inner, persistent) = open_substrate();
        let substrate = Namespaced::new(inner, DEFAULT_NAMESPACE);
        let listener = if persistent {
            StorageEventListener::attach(substrate.clone(), events.clone())
        } else {
            None
        };

        let storage = ContextStorage::new(substrate, &events);
        let beacon = open_beacon(catalog, &storage, &events);
        let settings = HomeCityStore::load(storage.clone());
        let trip_from = beacon.home_city().current();

        Self {
            storage,
            events,
            beacon,
            settings,
            catalog_source: "built-in",
            today: today(),
            tab: Tab::Legends,
            row: 0,
            sort: SortMode::Date,
            filter: FeedFilter::new(),
            trip_event: None,
            draft: trip_from.clone(),
            trip_from,
            _listener: listener,
        }
    }

    fn replace_catalog(&mut self, catalog: Catalog) {
        log::info!(
            "loaded {CATALOG_URL}: {} legends, {} events",
            catalog.legends().len(),
            catalog.events().len()
        );
        self.beacon = open_beacon(Rc::new(catalog), &self.storage, &self.events);
        self.catalog_source = CATALOG_URL;
        self.row = 0;
    }

    fn select_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        if self.tab == Tab::Trip {
            let city = self.beacon.home_city().on_leave_settings();
            log::debug!("left trip planner, home city {city}");
        }
        if tab == Tab::Trip {
            let current = self.beacon.home_city().current();
            let planner = TripPlanner::open(&self.settings, Some(&current));
            self.trip_from = planner.home_city().to_string();
            self.draft.clone_from(&self.trip_from);
        }
        self.tab = tab;
        self.row = 0;
    }

    fn commit_home_city(&mut self) {
        let city = self.draft.trim();
        if city.is_empty() {
            return;
        }
        let mut planner = TripPlanner::open(&self.settings, Some(&self.trip_from));
        planner.set_home_city(city);
        self.trip_from = planner.home_city().to_string();
    }

    fn feed_ids(&self) -> Vec<(String, String)> {
        self.beacon
            .feed(self.sort, &self.filter)
            .events()
            .iter()
            .map(|event| (event.id.clone(), event.legend_id.clone()))
            .collect()
    }

    fn row_count(&self) -> usize {
        match self.tab {
            Tab::Legends => self.beacon.catalog().legends().len(),
            Tab::Events => self.beacon.feed(self.sort, &self.filter).len(),
            Tab::Radar => self.beacon.radar().len(),
            Tab::Trip => 0,
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.select_tab(self.tab.previous()),
            KeyCode::Right => self.select_tab(self.tab.next()),
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => {
                self.row = (self.row + 1).min(self.row_count().saturating_sub(1));
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Backspace if self.tab == Tab::Trip => {
                self.draft.pop();
            }
            KeyCode::Char(c) if self.tab == Tab::Trip => self.draft.push(c),
            KeyCode::Char(c) => self.handle_char(c),
            _ => {}
        }
    }

    fn handle_char(&mut self, c: char) {
        if let Some(tab) = c
            .to_digit(10)
            .and_then(|digit| (digit as usize).checked_sub(1))
            .and_then(Tab::from_index)
        {
            self.select_tab(tab);
            return;
        }

        match (self.tab, c) {
            (_, ' ') => self.activate(),
            (Tab::Legends, 'd') => {
                self.beacon.toggle_detroit_founders();
            }
            (Tab::Legends, 'c') => self.beacon.clear_selection(),
            (Tab::Events, 's') => self.sort = self.sort.toggled(),
            (Tab::Events, 'f') => {
                if let Some((_, legend_id)) = self.feed_ids().get(self.row) {
                    self.filter.toggle(legend_id);
                    self.row = 0;
                }
            }
            (Tab::Events, 'a') => {
                self.filter = FeedFilter::new();
                self.row = 0;
            }
            (Tab::Events, 't') => {
                self.trip_event = self.feed_ids().get(self.row).map(|(id, _)| id.clone());
                self.select_tab(Tab::Trip);
            }
            (Tab::Radar, 't') => {
                self.trip_event = self
                    .beacon
                    .radar()
                    .events()
                    .get(self.row)
                    .map(|event| event.id.clone());
                self.select_tab(Tab::Trip);
            }
            _ => {}
        }
    }

    fn activate(&mut self) {
        match self.tab {
            Tab::Legends => {
                let id = self
                    .beacon
                    .catalog()
                    .legends()
                    .get(self.row)
                    .map(|legend| legend.id.clone());
                if let Some(id) = id {
                    if let Err(e) = self.beacon.toggle_legend(&id) {
                        log::warn!("{e}");
                    }
                }
            }
            Tab::Events => {
                if let Some((id, _)) = self.feed_ids().get(self.row) {
                    if let Err(e) = self.beacon.toggle_radar(id) {
                        log::warn!("{e}");
                    }
                }
            }
            Tab::Radar => {
                let id = self
                    .beacon
                    .radar()
                    .events()
                    .get(self.row)
                    .map(|event| event.id.clone());
                if let Some(id) = id {
                    self.beacon.remove_from_radar(&id);
                    self.row = self.row.min(self.beacon.radar().len().saturating_sub(1));
                }
            }
            Tab::Trip => self.commit_home_city(),
        }
    }
}

fn open_substrate() -> (Rc<dyn KeyValueStore>, bool) {
    match LocalStorage::open() {
        Ok(local) => (Rc::new(local) as Rc<dyn KeyValueStore>, true),
        Err(e) => {
            log::warn!("{e}; saved state will not survive a reload");
            (Rc::new(MemoryStore::new()) as Rc<dyn KeyValueStore>, false)
        }
    }
}

fn open_beacon(
    catalog: Rc<Catalog>,
    storage: &TabStorage,
    events: &StorageEvents,
) -> Beacon<TabStorage> {
    let mut beacon = Beacon::load(catalog, storage.clone());
    beacon
        .home_city_mut()
        .watch(events, storage.context(), |city| {
            log::info!("home city changed in another tab: {city}");
        });
    beacon
}

/// Today's date as `YYYY-MM-DD`, in UTC.
fn today() -> String {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    iso.get(..10).unwrap_or_default().to_string()
}

fn main() -> io::Result<()> {
    logger::init(log::LevelFilter::Info);

    let catalog = match Catalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("built-in catalog is broken: {e}");
            Catalog::new(Vec::new(), Vec::new())
        }
    };
    let dashboard = Rc::new(RefCell::new(Dashboard::new(Rc::new(catalog))));

    spawn_local(fetch_catalog(dashboard.clone()));

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let dashboard = dashboard.clone();
        move |event| dashboard.borrow_mut().handle_key(event.code)
    });

    terminal.draw_web(move |f| {
        let area = f.area();
        let block = Block::default()
            .title("Techno Beacon")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 1));
        f.render_widget(block, area);

        render_dashboard(&dashboard.borrow(), f, inner);
    });

    Ok(())
}

fn render_dashboard(dashboard: &Dashboard, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(dashboard, f, layout[0]);
    render_tabs(dashboard.tab, f, layout[1]);

    match dashboard.tab {
        Tab::Legends => render_legends(dashboard, f, layout[3]),
        Tab::Events => render_events(dashboard, f, layout[3]),
        Tab::Radar => render_radar(dashboard, f, layout[3]),
        Tab::Trip => render_trip(dashboard, f, layout[3]),
    }

    render_help(dashboard.tab, f, layout[4]);
}

fn render_header(dashboard: &Dashboard, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let stats = dashboard.beacon.stats();
    let mut spans = vec![
        Span::styled(
            format!(
                "Following: {}  Dates: {}  Overlaps: {}  Radar: {}",
                stats.selected_legends.len(),
                stats.feed_events,
                stats.overlapping_events,
                stats.radar_events
            ),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Home: {}", stats.home_city),
            Style::default().fg(Color::Cyan),
        ),
    ];
    if let Some(next) = stats.next_on_radar {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Next: {} {}", format_date(&next.date), next.city),
            Style::default().fg(Color::Yellow),
        ));
    }

    let block = Block::default()
        .title(format!("Overview ({} catalog)", dashboard.catalog_source))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Text::from(TextLine::from(spans)))
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn render_tabs(selected: Tab, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let titles = Tab::ALL
        .iter()
        .map(|tab| TextLine::from(tab.label()))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(selected.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

fn render_help(tab: Tab, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let keys = match tab {
        Tab::Legends => "Enter toggle  d Detroit founders  c clear",
        Tab::Events => "Enter save  s sort  f filter legend  a all  t plan trip",
        Tab::Radar => "Enter remove  t plan trip",
        Tab::Trip => "Type home city  Enter save  \u{2190}/\u{2192} leave",
    };
    let line = TextLine::from(vec![
        Span::styled(keys, Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled("1-4/Arrows", Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(
        Paragraph::new(Text::from(line)).alignment(Alignment::Center),
        area,
    );
}

fn render_empty(message: &str, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(paragraph, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|title| Cell::from(*title)).collect::<Vec<_>>()).style(
        Style::default()
            .fg(ACCENT)
            .bg(Color::Rgb(200, 200, 200))
            .add_modifier(Modifier::BOLD),
    )
}

/// Render `rows` with the cursor row kept in view and highlighted.
fn render_rows<'a>(
    header: Row<'a>,
    rows: Vec<Row<'a>>,
    widths: &[Constraint],
    cursor: usize,
    f: &mut ratzilla::ratatui::Frame<'_>,
    area: Rect,
) {
    let total = rows.len();
    let visible = usize::from(area.height.saturating_sub(1)).max(1);
    let offset = cursor.saturating_sub(visible - 1);

    let rows = rows
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, row)| {
            if index == cursor {
                row.style(Style::default().fg(Color::White).bg(ACCENT))
            } else {
                row
            }
        });

    let table = Table::new(rows, widths.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(table, area);

    let mut scrollbar_state = ScrollbarState::new(total)
        .position(cursor)
        .viewport_content_length(visible);
    let scrollbar =
        Scrollbar::new(ScrollbarOrientation::VerticalRight).thumb_style(Style::default().fg(ACCENT));
    let scroll_area = Rect {
        x: area.x,
        y: area.y.saturating_add(1),
        width: area.width,
        height: area.height.saturating_sub(1),
    };
    f.render_stateful_widget(scrollbar, scroll_area, &mut scrollbar_state);
}

fn render_legends(dashboard: &Dashboard, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let selection = dashboard.beacon.selection();
    let rows = dashboard
        .beacon
        .catalog()
        .legends()
        .iter()
        .map(|legend| {
            let marker = if selection.contains(&legend.id) { "●" } else { "○" };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(Span::styled(
                    legend.name.clone(),
                    Style::default().fg(hex_color(&legend.color)),
                )),
                Cell::from(legend.alias.clone()),
                Cell::from(legend.genre.clone()),
                Cell::from(if legend.detroit_founder { "Detroit" } else { "" }),
                Cell::from(legend.key_track.clone()),
            ])
            .style(Style::default().fg(Color::White))
        })
        .collect();

    render_rows(
        header_row(&["", "Legend", "Alias", "Genre", "", "Key track"]),
        rows,
        &[
            Constraint::Length(2),
            Constraint::Length(18),
            Constraint::Length(22),
            Constraint::Length(18),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
        dashboard.row,
        f,
        area,
    );
}

fn render_events(dashboard: &Dashboard, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let beacon = &dashboard.beacon;
    if beacon.selection().is_empty() {
        render_empty("Pick some legends first (tab 1)", f, area);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let mut chips = vec![Span::styled(
        format!("Sort: {}  ", dashboard.sort.label()),
        Style::default().fg(Color::Gray),
    )];
    for legend in beacon
        .selection()
        .ids()
        .iter()
        .filter_map(|id| beacon.catalog().legend(id))
    {
        let style = if dashboard.filter.is_active(&legend.id) {
            Style::default()
                .fg(hex_color(&legend.color))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        chips.push(Span::styled(format!("[{}] ", legend.name), style));
    }
    f.render_widget(Paragraph::new(TextLine::from(chips)), layout[0]);

    let feed = beacon.feed(dashboard.sort, &dashboard.filter);
    let rows = feed
        .entries()
        .into_iter()
        .map(|entry| {
            let date_style = if entry.is_overlap() {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let row_style = if entry.event.date < dashboard.today {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(if entry.on_radar { "★" } else { " " }),
                Cell::from(Span::styled(entry.event.date.clone(), date_style)),
                Cell::from(Span::styled(
                    entry.legend.name.clone(),
                    Style::default().fg(hex_color(&entry.legend.color)),
                )),
                Cell::from(format!("{}, {}", entry.event.city, entry.event.country)),
                Cell::from(entry.event.venue.clone()),
                Cell::from(if entry.also_playing.is_empty() {
                    String::new()
                } else {
                    format!("⚡ {}", entry.also_playing.join(", "))
                }),
            ])
            .style(row_style)
        })
        .collect();

    render_rows(
        header_row(&["", "Date", "Legend", "City", "Venue", "Also playing"]),
        rows,
        &[
            Constraint::Length(1),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(24),
            Constraint::Length(28),
            Constraint::Min(10),
        ],
        dashboard.row,
        f,
        layout[1],
    );
}

fn render_radar(dashboard: &Dashboard, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let beacon = &dashboard.beacon;
    let saved = beacon.radar().events();
    if saved.is_empty() {
        render_empty("Nothing saved yet. Press Enter on an event to add it.", f, area);
        return;
    }

    let rows = saved
        .iter()
        .map(|event| {
            let legend = beacon.catalog().legend(&event.legend_id);
            Row::new(vec![
                Cell::from(format_date(&event.date)),
                Cell::from(event.display_title(legend)),
                Cell::from(event.venue.clone()),
                Cell::from(format!("{}, {}", event.city, event.country)),
            ])
            .style(Style::default().fg(Color::White))
        })
        .collect();

    render_rows(
        header_row(&["Date", "Event", "Venue", "City"]),
        rows,
        &[
            Constraint::Length(16),
            Constraint::Length(32),
            Constraint::Length(28),
            Constraint::Min(10),
        ],
        dashboard.row,
        f,
        area,
    );
}

fn render_trip(dashboard: &Dashboard, f: &mut ratzilla::ratatui::Frame<'_>, area: Rect) {
    let beacon = &dashboard.beacon;
    let event = dashboard.trip_event.as_deref().and_then(|id| {
        beacon
            .catalog()
            .event(id)
            .or_else(|| beacon.radar().events().iter().find(|event| event.id == id))
    });

    let mut lines = vec![
        TextLine::from(vec![
            Span::styled("Travelling from: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}_", dashboard.draft),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        TextLine::from(""),
    ];

    let Some(event) = event else {
        lines.push(TextLine::from(Span::styled(
            "Press t on an event or a radar entry to plan a trip.",
            Style::default().fg(Color::Gray),
        )));
        f.render_widget(Paragraph::new(Text::from(lines)), area);
        return;
    };

    let legend = beacon.catalog().legend(&event.legend_id);
    let plan = TripPlan::new(event, legend, &dashboard.trip_from);

    lines.push(TextLine::from(Span::styled(
        format!(
            "{} · {}, {} · {}",
            event.display_title(legend),
            event.venue,
            event.city,
            format_date(&event.date)
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    lines.push(TextLine::from(Span::styled(
        format!("Estimated: {}", plan.cost_estimate),
        Style::default().fg(Color::Yellow),
    )));
    lines.push(TextLine::from(""));

    for flight in &plan.flights {
        lines.push(TextLine::from(Span::styled(
            flight.label.clone(),
            Style::default().fg(Color::White),
        )));
        lines.push(TextLine::from(format!("  {}", flight.google_flights)));
        lines.push(TextLine::from(format!("  {}", flight.skyscanner)));
    }
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        plan.hotel.label.clone(),
        Style::default().fg(Color::White),
    )));
    lines.push(TextLine::from(format!("  {}", plan.hotel.url)));
    lines.push(TextLine::from(""));

    for step in &plan.itinerary {
        lines.push(TextLine::from(vec![
            Span::styled(format!("{:<18}", step.day), Style::default().fg(Color::Gray)),
            Span::raw(step.action.clone()),
        ]));
    }

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// `#RRGGBB` to a terminal colour; grey when malformed.
fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| -> Option<u8> {
        u8::from_str_radix(digits.get(range)?, 16).ok()
    };
    match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

async fn fetch_catalog(dashboard: Rc<RefCell<Dashboard>>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let Ok(request) = Request::new_with_str_and_init(CATALOG_URL, &opts) else {
        return;
    };

    let Ok(response_value) =
        wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request)).await
    else {
        log::debug!("no {CATALOG_URL}, keeping the built-in roster");
        return;
    };

    let Ok(response) = response_value.dyn_into::<Response>() else {
        log::error!("Failed to read response");
        return;
    };

    if !response.ok() {
        log::debug!(
            "{CATALOG_URL} returned {}, keeping the built-in roster",
            response.status()
        );
        return;
    }

    let Ok(body) = response.json() else {
        log::error!("Failed to read {CATALOG_URL} body");
        return;
    };
    let Ok(json) = wasm_bindgen_futures::JsFuture::from(body).await else {
        log::error!("Failed to read {CATALOG_URL} body");
        return;
    };

    let document = match serde_wasm_bindgen::from_value::<CatalogDocument>(json) {
        Ok(document) => document,
        Err(error) => {
            log::error!("Failed to parse {CATALOG_URL}: {error}");
            return;
        }
    };

    dashboard
        .borrow_mut()
        .replace_catalog(Catalog::new(document.legends, document.events));
}
