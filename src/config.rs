use crate::{
    locale::Language,
    location::{City, LocationChoice},
    sky::{Palette, Sky},
};
use anyhow::Context;
use serde::Deserialize;
use std::{
    env,
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial selection. Defaults to `default_city`
    pub location: Option<LocationChoice>,
    /// Where we end up when "here" can't be resolved
    pub default_city: City,
    pub language: Language,
    pub weather_interval_secs: u64,
    pub background_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Open-Meteo host. The `/v1/forecast` path gets tacked on
    pub weather_url: String,
    pub geoip_url: String,
    pub palette: Palette,
    /// Green pulled out per unit of twilight red boost, in [0.25, 0.3]
    pub red_boost_green_ratio: f64,
    pub log_path: PathBuf,
}

impl Config {
    const PATH: &'static str = "./config.json";
    /// Override for [Self::PATH]
    const PATH_VARIABLE: &'static str = "SKYCLOCK_CONFIG";
    /// Timers never fire more often than this
    const MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// Load config from the file. A missing file just means defaults, but a
    /// broken one is an error. Runs before logging is set up, so no logs here
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var_os(Self::PATH_VARIABLE)
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::PATH.into());
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Error opening config file {}", path.display())
                })
            }
        };
        serde_json::from_reader(file).with_context(|| {
            format!("Error parsing config file {}", path.display())
        })
    }

    pub fn initial_location(&self) -> LocationChoice {
        self.location
            .unwrap_or(LocationChoice::City(self.default_city))
    }

    pub fn weather_interval(&self) -> Duration {
        Duration::from_secs(self.weather_interval_secs).max(Self::MIN_INTERVAL)
    }

    pub fn background_interval(&self) -> Duration {
        Duration::from_secs(self.background_interval_secs)
            .max(Self::MIN_INTERVAL)
    }

    pub fn sky(&self) -> Sky {
        Sky::new(self.palette, self.red_boost_green_ratio)
    }

    /// Shared HTTP agent for every external service
    pub fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .user_agent(concat!("skyclock/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: None,
            default_city: City::default(),
            language: Language::default(),
            weather_interval_secs: 5 * 60,
            background_interval_secs: 10 * 60,
            request_timeout_secs: 15,
            weather_url: "https://api.open-meteo.com".into(),
            geoip_url: "https://ipapi.co/json/".into(),
            palette: Palette::default(),
            red_boost_green_ratio: Sky::MIN_GREEN_RATIO,
            log_path: "./skyclock.log".into(),
        }
    }
}
