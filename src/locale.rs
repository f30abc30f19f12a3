//! User-facing strings. Everything that ends up on screen goes through here.

use serde::Deserialize;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Japanese,
}

impl Language {
    /// Short description for a WMO weather code, if we have one
    pub fn weather_label(self, code: i32) -> Option<&'static str> {
        let label = match self {
            Self::English => match code {
                0 => "Clear",
                1 => "Mainly clear",
                2 => "Partly cloudy",
                3 => "Overcast",
                45 => "Fog",
                48 => "Rime fog",
                51 => "Light drizzle",
                53 => "Drizzle",
                55 => "Dense drizzle",
                61 => "Light rain",
                63 => "Rain",
                65 => "Heavy rain",
                71 => "Light snow",
                73 => "Snow",
                75 => "Heavy snow",
                80 => "Light showers",
                81 => "Heavy showers",
                82 => "Violent showers",
                95 => "Thunderstorm",
                _ => return None,
            },
            Self::Japanese => match code {
                0 => "快晴",
                1 => "晴れ",
                2 => "薄曇り",
                3 => "曇り",
                45 => "霧",
                48 => "着氷霧",
                51 => "弱い霧雨",
                53 => "霧雨",
                55 => "強い霧雨",
                61 => "弱い雨",
                63 => "雨",
                65 => "強い雨",
                71 => "弱い雪",
                73 => "雪",
                75 => "強い雪",
                80 => "にわか雨",
                81 => "強いにわか雨",
                82 => "激しいにわか雨",
                95 => "雷雨",
                _ => return None,
            },
        };
        Some(label)
    }

    pub fn fetch_failed(self) -> &'static str {
        match self {
            Self::English => "Weather fetch failed",
            Self::Japanese => "取得失敗",
        }
    }

    pub fn locating(self) -> &'static str {
        match self {
            Self::English => "Locating...",
            Self::Japanese => "現在地取得中...",
        }
    }

    /// Status shown when "here" couldn't be resolved
    pub fn location_unavailable(self, fallback: &str) -> String {
        match self {
            Self::English => {
                format!("Location unavailable, showing {fallback}")
            }
            Self::Japanese => format!("現在地取得失敗（{fallback}）"),
        }
    }

    /// Place name for a resolved location that came back without a city
    pub fn current_location(self) -> &'static str {
        match self {
            Self::English => "Current location",
            Self::Japanese => "現在地",
        }
    }

    /// Name of the "use my location" option in the selector
    pub fn here(self) -> &'static str {
        match self {
            Self::English => "Here",
            Self::Japanese => "現在地",
        }
    }
}
