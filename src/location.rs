use crate::locale::Language;
use anyhow::{anyhow, Context};
use log::info;
use serde::Deserialize;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A point on the globe
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Cities with fixed coordinates. Order here is the order in the selector
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Sapporo,
    Sendai,
    #[default]
    Tokyo,
    Nagoya,
    Osaka,
    Fukuoka,
    Okinawa,
}

impl City {
    pub const ALL: [Self; 7] = [
        Self::Sapporo,
        Self::Sendai,
        Self::Tokyo,
        Self::Nagoya,
        Self::Osaka,
        Self::Fukuoka,
        Self::Okinawa,
    ];

    pub fn location(self) -> Location {
        let (latitude, longitude) = match self {
            Self::Sapporo => (43.06, 141.35),
            Self::Sendai => (38.27, 140.87),
            Self::Tokyo => (35.68, 139.76),
            Self::Nagoya => (35.18, 136.91),
            Self::Osaka => (34.69, 135.50),
            Self::Fukuoka => (33.59, 130.40),
            Self::Okinawa => (26.21, 127.68),
        };
        Location::new(latitude, longitude)
    }

    /// Lowercase key, as used in the config file
    pub fn key(self) -> &'static str {
        match self {
            Self::Sapporo => "sapporo",
            Self::Sendai => "sendai",
            Self::Tokyo => "tokyo",
            Self::Nagoya => "nagoya",
            Self::Osaka => "osaka",
            Self::Fukuoka => "fukuoka",
            Self::Okinawa => "okinawa",
        }
    }

    pub fn name(self, language: Language) -> &'static str {
        match (language, self) {
            (Language::English, Self::Sapporo) => "Sapporo",
            (Language::English, Self::Sendai) => "Sendai",
            (Language::English, Self::Tokyo) => "Tokyo",
            (Language::English, Self::Nagoya) => "Nagoya",
            (Language::English, Self::Osaka) => "Osaka",
            (Language::English, Self::Fukuoka) => "Fukuoka",
            (Language::English, Self::Okinawa) => "Okinawa",
            (Language::Japanese, Self::Sapporo) => "札幌",
            (Language::Japanese, Self::Sendai) => "仙台",
            (Language::Japanese, Self::Tokyo) => "東京",
            (Language::Japanese, Self::Nagoya) => "名古屋",
            (Language::Japanese, Self::Osaka) => "大阪",
            (Language::Japanese, Self::Fukuoka) => "福岡",
            (Language::Japanese, Self::Okinawa) => "沖縄",
        }
    }
}

impl FromStr for City {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|city| city.key() == s)
            .ok_or_else(|| anyhow!("Unknown city `{s}`"))
    }
}

/// Something the user can pick in the selector
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum LocationChoice {
    /// Wherever the IP geolocation service thinks we are
    Here,
    City(City),
}

impl LocationChoice {
    /// Every option in selector order: "here" first, then the cities
    pub fn options() -> impl Iterator<Item = Self> {
        [Self::Here]
            .into_iter()
            .chain(City::ALL.into_iter().map(Self::City))
    }

    /// Move `offset` steps through the selector options, wrapping around
    pub fn cycle(self, offset: isize) -> Self {
        let options: Vec<Self> = Self::options().collect();
        let index = options
            .iter()
            .position(|option| *option == self)
            .unwrap_or_default() as isize;
        let len = options.len() as isize;
        options[(index + offset).rem_euclid(len) as usize]
    }
}

impl FromStr for LocationChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "here" {
            Ok(Self::Here)
        } else {
            s.parse().map(Self::City)
        }
    }
}

impl TryFrom<String> for LocationChoice {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A location resolved from an external lookup
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLocation {
    pub location: Location,
    pub city: Option<String>,
}

/// Coarse geolocation, without any permission prompt
pub trait GeoIp: Send + Sync {
    fn locate(&self) -> anyhow::Result<ResolvedLocation>;
}

/// IP geolocation via an ipapi.co-compatible JSON endpoint
#[derive(Debug)]
pub struct IpApi {
    agent: ureq::Agent,
    url: String,
}

impl IpApi {
    pub fn new(agent: ureq::Agent, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }
}

impl GeoIp for IpApi {
    fn locate(&self) -> anyhow::Result<ResolvedLocation> {
        info!("Looking up location from {}", self.url);
        let response = self
            .agent
            .get(&self.url)
            .call()
            .with_context(|| {
                format!("Error fetching location from {}", self.url)
            })?;
        let body: IpApiResponse = response
            .into_json()
            .context("Error parsing location as JSON")?;
        Ok(body.into())
    }
}

/// https://ipapi.co/api/#complete-location
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    city: Option<String>,
}

impl From<IpApiResponse> for ResolvedLocation {
    fn from(response: IpApiResponse) -> Self {
        Self {
            location: Location::new(response.latitude, response.longitude),
            // Some addresses come back with an empty city
            city: response.city.filter(|city| !city.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_presets() {
        let expected = [
            ("sapporo", 43.06, 141.35),
            ("sendai", 38.27, 140.87),
            ("tokyo", 35.68, 139.76),
            ("nagoya", 35.18, 136.91),
            ("osaka", 34.69, 135.50),
            ("fukuoka", 33.59, 130.40),
            ("okinawa", 26.21, 127.68),
        ];
        assert_eq!(City::ALL.len(), expected.len());
        for (key, latitude, longitude) in expected {
            let city: City = key.parse().unwrap();
            assert_eq!(city.key(), key);
            assert_eq!(city.location(), Location::new(latitude, longitude));
        }
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(
            "here".parse::<LocationChoice>().unwrap(),
            LocationChoice::Here
        );
        assert_eq!(
            "osaka".parse::<LocationChoice>().unwrap(),
            LocationChoice::City(City::Osaka)
        );
        assert!("Osaka".parse::<LocationChoice>().is_err());
        assert!("atlantis".parse::<LocationChoice>().is_err());
    }

    #[test]
    fn test_cycle() {
        let tokyo = LocationChoice::City(City::Tokyo);
        assert_eq!(tokyo.cycle(1), LocationChoice::City(City::Nagoya));
        assert_eq!(tokyo.cycle(-3), LocationChoice::Here);
        assert_eq!(
            LocationChoice::Here.cycle(-1),
            LocationChoice::City(City::Okinawa)
        );
        assert_eq!(
            LocationChoice::City(City::Okinawa).cycle(1),
            LocationChoice::Here
        );
    }

    #[test]
    fn test_parse_ip_response() {
        let body = r#"{
            "ip": "203.0.113.7",
            "city": "Shibuya",
            "country_name": "Japan",
            "latitude": 35.6619,
            "longitude": 139.704
        }"#;
        let response: IpApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            ResolvedLocation::from(response),
            ResolvedLocation {
                location: Location::new(35.6619, 139.704),
                city: Some("Shibuya".into()),
            }
        );
    }

    #[test]
    fn test_parse_ip_response_without_city() {
        let body = r#"{"latitude": 1.5, "longitude": -2.5, "city": ""}"#;
        let response: IpApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(ResolvedLocation::from(response).city, None);
    }

    #[test]
    fn test_parse_ip_error_response() {
        // What ipapi.co sends when you get rate limited
        let body = r#"{"error": true, "reason": "RateLimited"}"#;
        assert!(serde_json::from_str::<IpApiResponse>(body).is_err());
    }
}
