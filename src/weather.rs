use crate::{locale::Language, location::Location};
use anyhow::Context;
use log::info;
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};

/// WMO weather interpretation code
/// https://open-meteo.com/en/docs#weathervariables
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct WeatherCode(pub i32);

impl WeatherCode {
    /// Short description, or `code:<n>` if we don't know this one
    pub fn label(self, language: Language) -> String {
        match language.weather_label(self.0) {
            Some(label) => label.to_owned(),
            None => format!("code:{}", self.0),
        }
    }
}

impl Display for WeatherCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gotta know weather or not it's gonna rain
pub trait WeatherApi: Send + Sync {
    /// Fetch conditions right now at the given location. Blocks!
    fn current(&self, location: Location) -> anyhow::Result<CurrentWeather>;
}

/// Current conditions from Open-Meteo. Free and no API key needed
#[derive(Debug)]
pub struct OpenMeteo {
    agent: ureq::Agent,
    host: String,
}

impl OpenMeteo {
    pub fn new(agent: ureq::Agent, host: impl Into<String>) -> Self {
        Self {
            agent,
            host: host.into(),
        }
    }
}

impl WeatherApi for OpenMeteo {
    fn current(&self, location: Location) -> anyhow::Result<CurrentWeather> {
        let url = format!("{}/v1/forecast", self.host.trim_end_matches('/'));
        info!("Fetching weather for {location}");
        // ureq turns 4xx/5xx into errors for us
        let response = self
            .agent
            .get(&url)
            .query("latitude", &location.latitude.to_string())
            .query("longitude", &location.longitude.to_string())
            .query("current_weather", "true")
            .call()
            .with_context(|| format!("Error fetching weather from {url}"))?;
        let forecast: Forecast = response
            .into_json()
            .context("Error parsing weather as JSON")?;
        Ok(forecast.current_weather)
    }
}

/// The parts of the forecast response we care about
#[derive(Debug, Deserialize)]
struct Forecast {
    current_weather: CurrentWeather,
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct CurrentWeather {
    /// Celsius, unless requested otherwise
    pub temperature: f64,
    #[serde(rename = "weathercode")]
    pub code: WeatherCode,
}

impl CurrentWeather {
    /// Formatted temperature. Whole numbers drop the decimal
    pub fn temperature(&self) -> String {
        format!("{}°C", self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        assert_eq!(WeatherCode(0).label(Language::English), "Clear");
        assert_eq!(WeatherCode(95).label(Language::Japanese), "雷雨");
        assert_eq!(WeatherCode(999).label(Language::English), "code:999");
        assert_eq!(WeatherCode(77).label(Language::Japanese), "code:77");
    }

    #[test]
    fn test_temperature() {
        let weather = |temperature| CurrentWeather {
            temperature,
            code: WeatherCode(0),
        };
        assert_eq!(weather(12.5).temperature(), "12.5°C");
        assert_eq!(weather(12.0).temperature(), "12°C");
        assert_eq!(weather(-3.2).temperature(), "-3.2°C");
    }

    #[test]
    fn test_parse_forecast() {
        let body = r#"{
            "latitude": 35.7,
            "longitude": 139.75,
            "generationtime_ms": 0.04,
            "utc_offset_seconds": 0,
            "timezone": "GMT",
            "elevation": 40.0,
            "current_weather_units": {
                "temperature": "°C",
                "weathercode": "wmo code"
            },
            "current_weather": {
                "time": "2024-05-24T17:00",
                "interval": 900,
                "temperature": 21.4,
                "windspeed": 8.6,
                "winddirection": 170,
                "is_day": 1,
                "weathercode": 61
            }
        }"#;
        let forecast: Forecast = serde_json::from_str(body).unwrap();
        assert_eq!(
            forecast.current_weather,
            CurrentWeather {
                temperature: 21.4,
                code: WeatherCode(61),
            }
        );
    }

    #[test]
    fn test_parse_forecast_missing_fields() {
        let body = r#"{"current_weather": {"temperature": 21.4}}"#;
        assert!(serde_json::from_str::<Forecast>(body).is_err());
        let body = r#"{"error": true, "reason": "Latitude out of range"}"#;
        assert!(serde_json::from_str::<Forecast>(body).is_err());
    }
}
