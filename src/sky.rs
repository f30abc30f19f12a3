//! Sky colors. The background is a vertical gradient that follows the sun
//! through the day, then gets washed out, grayed or darkened by the weather.

use crate::{util::Color, weather::WeatherCode};
use chrono::{NaiveTime, Timelike};
use serde::Deserialize;
use std::{
    f64::consts::PI,
    fmt::{self, Display, Formatter},
};

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Red added to both stops at the peak of sunrise/sunset
const MAX_RED_BOOST: f64 = 80.0;
/// Gray that rain and overcast tints blend toward
const GRAY: f64 = 140.0;

/// Base colors that the time of day blends between
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub night_top: Color,
    pub night_bottom: Color,
    pub day_top: Color,
    pub day_bottom: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            night_top: Color::new(20, 32, 48),
            night_bottom: Color::new(40, 60, 80),
            day_top: Color::new(80, 176, 255),
            day_bottom: Color::new(224, 240, 255),
        }
    }
}

/// Two-stop top-to-bottom gradient
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Gradient {
    pub top: Color,
    pub bottom: Color,
}

impl Gradient {
    /// Color at `position` down the gradient, 0 being the top and 1 the bottom
    pub fn at(&self, position: f64) -> Color {
        self.top.lerp(self.bottom, position.clamp(0.0, 1.0))
    }
}

/// CSS, mostly so the logs are easy to paste into a browser
impl Display for Gradient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "linear-gradient(180deg, {} 0%, {} 100%)",
            self.top.css(),
            self.bottom.css()
        )
    }
}

/// The background colorizer
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sky {
    palette: Palette,
    /// How much green is pulled out per unit of red boost
    green_ratio: f64,
}

impl Sky {
    pub const MIN_GREEN_RATIO: f64 = 0.25;
    pub const MAX_GREEN_RATIO: f64 = 0.3;

    pub fn new(palette: Palette, green_ratio: f64) -> Self {
        Self {
            palette,
            green_ratio: green_ratio
                .clamp(Self::MIN_GREEN_RATIO, Self::MAX_GREEN_RATIO),
        }
    }

    /// Compute the background for the given weather at the given time of day.
    /// Pure: same inputs, same colors.
    pub fn gradient(&self, code: WeatherCode, time: NaiveTime) -> Gradient {
        self.gradient_at_scale(code, sun_scale(day_progress(time)))
    }

    fn gradient_at_scale(&self, code: WeatherCode, scale: f64) -> Gradient {
        let [mut top, mut bottom] = self.base(scale);
        for tint in Tint::for_code(code) {
            top = tint.apply(top);
            bottom = tint.apply(bottom);
        }
        Gradient {
            top: Color::from_channels(top),
            bottom: Color::from_channels(bottom),
        }
    }

    /// Day/night blend plus the twilight red boost, before any weather tint
    fn base(&self, scale: f64) -> [[f64; 3]; 2] {
        let palette = &self.palette;
        let boost = MAX_RED_BOOST * red_boost_factor(scale);
        [
            (palette.night_top, palette.day_top),
            (palette.night_bottom, palette.day_bottom),
        ]
        .map(|(night, day)| {
            let [red, green, blue] = night.lerp(day, scale).channels();
            [red + boost, green - self.green_ratio * boost, blue]
        })
    }
}

impl Default for Sky {
    fn default() -> Self {
        Self::new(Palette::default(), Self::MIN_GREEN_RATIO)
    }
}

/// Fraction of the day elapsed since local midnight, in [0, 1)
pub fn day_progress(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / SECONDS_PER_DAY
}

/// Stand-in for the height of the sun. 0 at midnight, 1 at noon, following a
/// cosine through dawn and dusk
pub fn sun_scale(day_progress: f64) -> f64 {
    let sun = -(2.0 * PI * day_progress).cos();
    (sun + 1.0) / 2.0
}

/// Peaks at 1 halfway between night and day, 0 at noon and midnight
pub fn red_boost_factor(scale: f64) -> f64 {
    (1.0 - 2.0 * (scale - 0.5).abs()).powi(3)
}

/// A weather-dependent adjustment to the sky
#[derive(Copy, Clone, Debug, PartialEq)]
enum Tint {
    /// Fog, drizzle, snow and thin clouds wash the sky out toward white
    Whiten(f64),
    /// Overcast and rain push it toward gray
    Gray(f64),
    /// Thunderstorms darken everything
    Darken(f64),
}

impl Tint {
    /// Every tint that applies to a code, in the order they get applied
    fn for_code(WeatherCode(code): WeatherCode) -> impl Iterator<Item = Self> {
        let whiten = match code {
            2 => Some(0.1),
            45 | 48 => Some(0.25),
            51 => Some(0.15),
            53 => Some(0.2),
            55 => Some(0.25),
            71 => Some(0.25),
            73 => Some(0.35),
            75 => Some(0.5),
            _ => None,
        };
        let gray = match code {
            3 => Some(0.25),
            61 => Some(0.15),
            63 => Some(0.3),
            65 => Some(0.5),
            80 => Some(0.2),
            81 => Some(0.35),
            82 => Some(0.5),
            _ => None,
        };
        let darken = match code {
            95 => Some(0.5),
            _ => None,
        };
        whiten
            .map(Self::Whiten)
            .into_iter()
            .chain(gray.map(Self::Gray))
            .chain(darken.map(Self::Darken))
    }

    fn apply(self, color: [f64; 3]) -> [f64; 3] {
        let mix = |target: f64, amount: f64| {
            color.map(|channel| channel * (1.0 - amount) + target * amount)
        };
        match self {
            Self::Whiten(amount) => mix(255.0, amount),
            Self::Gray(amount) => mix(GRAY, amount),
            Self::Darken(amount) => {
                color.map(|channel| channel * (1.0 - amount))
            }
        }
    }
}
