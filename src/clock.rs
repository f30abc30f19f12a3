use chrono::{DateTime, TimeZone};

/// Formatted clock fields
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClockText {
    /// `H:MM:SS`, 24-hour with no padding on the hour
    pub time: String,
    /// `YYYY MM/DD`
    pub date: String,
}

/// Format a timestamp for the clock. Callers pass in a fresh `Local::now()`
/// every tick, so there's no drift to correct.
pub fn render<Tz: TimeZone>(now: &DateTime<Tz>) -> ClockText
where
    Tz::Offset: std::fmt::Display,
{
    // https://docs.rs/chrono/latest/chrono/format/strftime/index.html
    ClockText {
        time: now.format("%-H:%M:%S").to_string(),
        date: now.format("%Y %m/%d").to_string(),
    }
}
