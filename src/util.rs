use anyhow::anyhow;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// 24-bit Red-Green-Blue color. Serializes/deserializes as HTML format
/// (#rrggbb), so palettes can be written in the config file.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build a color from floating point channels. Each channel is clamped to
    /// [0, 255] and rounded to the nearest integer.
    pub fn from_channels([red, green, blue]: [f64; 3]) -> Self {
        let channel = |value: f64| value.clamp(0.0, 255.0).round() as u8;
        Self {
            red: channel(red),
            green: channel(green),
            blue: channel(blue),
        }
    }

    pub fn channels(self) -> [f64; 3] {
        [self.red.into(), self.green.into(), self.blue.into()]
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Linear interpolation between two colors. `factor` 0 gives `self`, 1
    /// gives `other`. Channels are rounded independently.
    pub fn lerp(self, other: Self, factor: f64) -> Self {
        let [r0, g0, b0] = self.channels();
        let [r1, g1, b1] = other.channels();
        Self::from_channels([
            r0 + factor * (r1 - r0),
            g0 + factor * (g1 - g0),
            b0 + factor * (b1 - b0),
        ])
    }

    /// CSS functional notation, e.g. `rgb(80,176,255)`
    pub fn css(self) -> String {
        format!("rgb({})", self.to_bytes().iter().join(","))
    }
}

// This is lossy, since we throw away the first 8 bits. Hope it wasn't RGBA!
impl From<u32> for Color {
    fn from(value: u32) -> Self {
        // Casting will truncate the 24 most significant bits
        let red = (value >> 16) as u8;
        let green = (value >> 8) as u8;
        let blue = value as u8;
        Self { red, green, blue }
    }
}

impl From<Color> for ratatui::style::Color {
    fn from(color: Color) -> Self {
        Self::Rgb(color.red, color.green, color.blue)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('#') {
            Some(hex) if hex.len() == 6 => {
                let value = u32::from_str_radix(hex, 16)?;
                Ok(value.into())
            }
            _ => Err(anyhow!("Invalid color string: {}", s)),
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:0>2x}{:0>2x}{:0>2x}", self.red, self.green, self.blue)
    }
}

// These impls are needed for serde
impl TryFrom<String> for Color {
    type Error = <Color as FromStr>::Err;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let parse = |s: &str| s.parse::<Color>().unwrap();
        assert_eq!(parse("#50b0ff"), Color::new(80, 176, 255));
        assert_eq!(parse("#142030"), Color::new(20, 32, 48));
        assert!("50b0ff".parse::<Color>().is_err());
        assert!("#50b0f".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::new(224, 240, 255).to_string(), "#e0f0ff");
        assert_eq!(Color::new(0, 1, 2).to_string(), "#000102");
        assert_eq!(Color::new(80, 176, 255).css(), "rgb(80,176,255)");
    }

    #[test]
    fn test_from_channels_clamps() {
        assert_eq!(
            Color::from_channels([-12.0, 127.5, 300.0]),
            Color::new(0, 128, 255)
        );
    }

    #[test]
    fn test_lerp() {
        let night = Color::new(20, 32, 48);
        let day = Color::new(80, 176, 255);
        assert_eq!(night.lerp(day, 0.0), night);
        assert_eq!(night.lerp(day, 1.0), day);
        assert_eq!(night.lerp(day, 0.5), Color::new(50, 104, 152));
    }
}
