//! The controller owns all mutable state. Network calls happen on throwaway
//! threads, which report back over a channel, so the controller is the only
//! thing that ever writes.

use crate::{
    clock::{self, ClockText},
    config::Config,
    locale::Language,
    location::{City, GeoIp, Location, LocationChoice, ResolvedLocation},
    sky::{Gradient, Sky},
    weather::{CurrentWeather, WeatherApi, WeatherCode},
};
use chrono::{DateTime, Local, NaiveTime};
use log::{debug, error, info, trace, warn};
use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

/// Everything that ends up on screen
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub language: Language,
    pub selection: LocationChoice,
    pub location: Location,
    /// Human-readable name for [Self::location]
    pub place: String,
    /// Last successfully fetched code. Failed fetches leave this alone
    pub weather_code: WeatherCode,
    pub clock: ClockText,
    /// Empty until the first successful fetch
    pub temperature: String,
    pub label: String,
    pub status: Option<Status>,
    pub gradient: Gradient,
}

impl State {
    pub fn status_text(&self) -> Option<String> {
        self.status.map(|status| status.text(self.language))
    }
}

/// Short message about something in progress or something that went wrong
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Locating,
    /// Couldn't find "here", so we're showing this city instead
    LocationUnavailable(City),
    FetchFailed,
}

impl Status {
    pub fn text(self, language: Language) -> String {
        match self {
            Self::Locating => language.locating().to_owned(),
            Self::LocationUnavailable(city) => {
                language.location_unavailable(city.name(language))
            }
            Self::FetchFailed => language.fetch_failed().to_owned(),
        }
    }
}

/// Results coming back from worker threads
#[derive(Debug)]
enum Event {
    Located(anyhow::Result<ResolvedLocation>),
    Weather {
        /// Where the request was for, so we can drop outdated results
        location: Location,
        result: anyhow::Result<CurrentWeather>,
    },
}

/// A repeating deadline
#[derive(Debug)]
struct Timer {
    interval: Duration,
    /// `None` means fire on the next tick
    next: Option<Instant>,
}

impl Timer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// Check if the timer is due, and if so schedule the next firing
    fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now < next => false,
            _ => {
                self.reset(now);
                true
            }
        }
    }

    fn reset(&mut self, now: Instant) {
        self.next = Some(now + self.interval);
    }
}

/// Coordinates the clock, location lookup, weather fetching and background
pub struct Controller {
    state: State,
    default_city: City,
    sky: Sky,
    weather_api: Arc<dyn WeatherApi>,
    geo_ip: Arc<dyn GeoIp>,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    weather_timer: Timer,
    background_timer: Timer,
}

impl Controller {
    pub fn new(
        config: &Config,
        weather_api: Arc<dyn WeatherApi>,
        geo_ip: Arc<dyn GeoIp>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let language = config.language;
        let default_city = config.default_city;
        let state = State {
            language,
            selection: LocationChoice::City(default_city),
            location: default_city.location(),
            place: default_city.name(language).to_owned(),
            weather_code: WeatherCode::default(),
            clock: ClockText::default(),
            temperature: String::new(),
            label: String::new(),
            status: None,
            gradient: Gradient::default(),
        };
        Self {
            state,
            default_city,
            sky: config.sky(),
            weather_api,
            geo_ip,
            sender,
            receiver,
            weather_timer: Timer::new(config.weather_interval()),
            background_timer: Timer::new(config.background_interval()),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Switch to a new location. Cities are applied immediately, "here" kicks
    /// off a lookup in the background. Either way, a weather fetch follows.
    pub fn select(&mut self, choice: LocationChoice) {
        info!("Selected location {choice:?}");
        self.state.selection = choice;
        self.state.status = None;
        match choice {
            LocationChoice::City(city) => self.set_city(city),
            LocationChoice::Here => self.locate(),
        }
    }

    /// Run one iteration: apply results from workers, update the clock, and
    /// fire any timers that are due
    pub fn tick(&mut self) {
        self.tick_at(Instant::now(), Local::now());
    }

    fn tick_at(&mut self, instant: Instant, now: DateTime<Local>) {
        trace!("Running controller tick");
        while let Ok(event) = self.receiver.try_recv() {
            self.handle(event, now.time());
        }

        self.state.clock = clock::render(&now);

        // Nothing to fetch for until the lookup finishes
        if !self.locating() && self.weather_timer.poll(instant) {
            self.fetch_weather();
        }
        if self.background_timer.poll(instant) {
            self.refresh_background(now.time());
        }
    }

    fn handle(&mut self, event: Event, now: NaiveTime) {
        match event {
            Event::Located(result) => self.on_located(result),
            Event::Weather { location, result } => {
                if self.locating() || location != self.state.location {
                    debug!("Dropping weather for old location {location}");
                } else {
                    self.on_weather(result, now);
                }
            }
        }
    }

    /// Is a "here" lookup still in flight?
    fn locating(&self) -> bool {
        self.state.status == Some(Status::Locating)
    }

    fn set_city(&mut self, city: City) {
        self.state.location = city.location();
        self.state.place = city.name(self.state.language).to_owned();
        self.fetch_weather();
    }

    /// Spawn a thread to find out where we are
    fn locate(&mut self) {
        self.state.status = Some(Status::Locating);
        self.weather_timer.reset(Instant::now());
        let geo_ip = Arc::clone(&self.geo_ip);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = geo_ip.locate();
            // Receiver only goes away during shutdown
            let _ = sender.send(Event::Located(result));
        });
    }

    fn on_located(&mut self, result: anyhow::Result<ResolvedLocation>) {
        // User picked something else while we were waiting
        if self.state.selection != LocationChoice::Here {
            debug!("Dropping location lookup, selection changed");
            return;
        }

        match result {
            Ok(resolved) => {
                info!(
                    "Resolved location to {} ({:?})",
                    resolved.location, resolved.city
                );
                self.state.location = resolved.location;
                self.state.place = resolved.city.unwrap_or_else(|| {
                    self.state.language.current_location().to_owned()
                });
                self.state.status = None;
                self.fetch_weather();
            }
            Err(err) => {
                warn!(
                    "Error resolving location, falling back to {:?}: {err:?}",
                    self.default_city
                );
                self.set_city(self.default_city);
                self.state.status =
                    Some(Status::LocationUnavailable(self.default_city));
            }
        }
    }

    /// Spawn a thread to fetch weather for the current location
    fn fetch_weather(&mut self) {
        self.weather_timer.reset(Instant::now());
        let location = self.state.location;
        let weather_api = Arc::clone(&self.weather_api);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = weather_api.current(location);
            let _ = sender.send(Event::Weather { location, result });
        });
    }

    fn on_weather(
        &mut self,
        result: anyhow::Result<CurrentWeather>,
        now: NaiveTime,
    ) {
        match result {
            Ok(weather) => {
                info!(
                    "Weather is {} with code {}",
                    weather.temperature(),
                    weather.code
                );
                self.state.temperature = weather.temperature();
                self.state.label = weather.code.label(self.state.language);
                self.state.weather_code = weather.code;
                // A fallback notice should stick around, other statuses are
                // resolved by a good fetch
                if !matches!(
                    self.state.status,
                    Some(Status::LocationUnavailable(_))
                ) {
                    self.state.status = None;
                }
                self.refresh_background(now);
            }
            Err(err) => {
                // Keep the old values on screen, and definitely don't touch
                // the weather code. This replaces a fallback notice too,
                // since the failure is the more pressing news
                error!("Error fetching weather: {err:?}");
                self.state.status = Some(Status::FetchFailed);
            }
        }
    }

    fn refresh_background(&mut self, now: NaiveTime) {
        self.background_timer.reset(Instant::now());
        let gradient = self.sky.gradient(self.state.weather_code, now);
        debug!("Background for code {}: {gradient}", self.state.weather_code);
        self.state.gradient = gradient;
    }
}
