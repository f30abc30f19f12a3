use crate::{
    location::{City, LocationChoice},
    state::State,
    util::Color,
};
use anyhow::Context;
use log::{info, trace};
use ratatui::{
    buffer::Buffer,
    crossterm::event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    },
    layout::{Alignment, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Widget,
    DefaultTerminal,
};
use std::time::Duration;

/// Something the user asked for from the keyboard
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Quit,
    Select(LocationChoice),
    /// Step through the selector, relative to the current selection
    Cycle(isize),
}

/// Manage the terminal. Owns the screen for as long as it's alive
pub struct Display {
    terminal: DefaultTerminal,
    /// The state currently on the screen. `None` forces a redraw
    drawn: Option<State>,
}

impl Display {
    /// How long to wait for input between ticks
    pub const INTERVAL: Duration = Duration::from_millis(200);

    pub fn new() -> anyhow::Result<Self> {
        let terminal =
            ratatui::try_init().context("Error initializing terminal")?;
        info!("Terminal initialized");
        Ok(Self {
            terminal,
            drawn: None,
        })
    }

    /// Redraw the screen, if anything changed since the last draw
    pub fn tick(&mut self, state: &State) -> anyhow::Result<()> {
        if self.drawn.as_ref() == Some(state) {
            return Ok(());
        }
        trace!("Drawing frame");
        self.terminal
            .draw(|frame| frame.render_widget(Screen(state), frame.area()))
            .context("Error drawing to terminal")?;
        self.drawn = Some(state.clone());
        Ok(())
    }

    /// Wait up to `timeout` for a key press
    pub fn poll_input(
        &mut self,
        timeout: Duration,
    ) -> anyhow::Result<Option<Command>> {
        if !event::poll(timeout).context("Error polling for input")? {
            return Ok(None);
        }
        match event::read().context("Error reading input")? {
            Event::Key(key) => Ok(command(key)),
            Event::Resize(_, _) => {
                self.drawn = None;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        ratatui::restore();
        info!("Terminal restored");
    }
}

/// Map a key to a command. `0`/`h` is "here", `1`-`7` are the cities in
/// selector order
fn command(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('0' | 'h') => Some(Command::Select(LocationChoice::Here)),
        KeyCode::Char(c @ '1'..='7') => {
            let index = c.to_digit(10)? as usize - 1;
            City::ALL
                .get(index)
                .map(|city| Command::Select(LocationChoice::City(*city)))
        }
        KeyCode::Left => Some(Command::Cycle(-1)),
        KeyCode::Right => Some(Command::Cycle(1)),
        _ => None,
    }
}

/// Everything on screen, as a widget
struct Screen<'a>(&'a State);

impl Screen<'_> {
    /// Fraction of the way down the screen, for picking gradient colors
    fn position(area: Rect, y: u16) -> f64 {
        if area.height <= 1 {
            0.0
        } else {
            f64::from(y - area.y) / f64::from(area.height - 1)
        }
    }

    /// Draw a line centered horizontally, in a color that stands out against
    /// the background at that row
    fn draw_line(&self, line: Line<'_>, area: Rect, y: u16, buf: &mut Buffer) {
        if y >= area.bottom() {
            return;
        }
        let background = self.0.gradient.at(Self::position(area, y));
        line.fg(text_color(background))
            .alignment(Alignment::Center)
            .render(Rect::new(area.x, y, area.width, 1), buf);
    }

    fn selector(&self) -> Line<'static> {
        let state = self.0;
        let spans = LocationChoice::options().enumerate().map(|(i, option)| {
            let name = match option {
                LocationChoice::Here => state.language.here(),
                LocationChoice::City(city) => city.name(state.language),
            };
            let span = Span::raw(format!(" {i} {name} "));
            if option == state.selection {
                span.add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                span
            }
        });
        Line::from(spans.collect::<Vec<_>>())
    }
}

impl Widget for Screen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.0;

        // Sky first, one color per row
        for y in area.top()..area.bottom() {
            let color = state.gradient.at(Self::position(area, y));
            buf.set_style(
                Rect::new(area.x, y, area.width, 1),
                Style::default().bg(color.into()),
            );
        }

        let weather = [state.temperature.as_str(), state.label.as_str()]
            .into_iter()
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("  ");
        let mut lines = vec![
            Line::from(state.clock.time.clone()).bold(),
            Line::from(state.clock.date.clone()),
            Line::default(),
            Line::from(state.place.clone()).bold(),
            Line::from(weather),
        ];
        if let Some(status) = state.status_text() {
            lines.push(Line::from(status).italic());
        }

        // Vertically centered, leaving the bottom row for the selector
        let height = lines.len() as u16;
        let top = area.y + area.height.saturating_sub(height + 1) / 2;
        for (y, line) in (top..).zip(lines) {
            self.draw_line(line, area, y, buf);
        }
        if let Some(bottom) = area.bottom().checked_sub(1) {
            self.draw_line(self.selector(), area, bottom, buf);
        }
    }
}

/// Black on light skies, white on dark ones
fn text_color(background: Color) -> ratatui::style::Color {
    // Rec. 601 luma
    let luma = 0.299 * f64::from(background.red)
        + 0.587 * f64::from(background.green)
        + 0.114 * f64::from(background.blue);
    if luma > 150.0 {
        ratatui::style::Color::Black
    } else {
        ratatui::style::Color::White
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ClockText,
        locale::Language,
        sky::Gradient,
        state::Status,
        weather::WeatherCode,
    };

    fn state() -> State {
        State {
            language: Language::English,
            selection: LocationChoice::City(City::Tokyo),
            location: City::Tokyo.location(),
            place: "Tokyo".into(),
            weather_code: WeatherCode(3),
            clock: ClockText {
                time: "7:03:09".into(),
                date: "2024 05/04".into(),
            },
            temperature: "18.5°C".into(),
            label: "Overcast".into(),
            status: Some(Status::FetchFailed),
            gradient: Gradient {
                top: Color::new(20, 32, 48),
                bottom: Color::new(224, 240, 255),
            },
        }
    }

    fn render(state: &State, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        Screen(state).render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
    }

    #[test]
    fn test_background() {
        let buf = render(&state(), 80, 21);
        assert_eq!(buf[(0, 0)].bg, ratatui::style::Color::Rgb(20, 32, 48));
        assert_eq!(buf[(79, 0)].bg, ratatui::style::Color::Rgb(20, 32, 48));
        assert_eq!(
            buf[(0, 10)].bg,
            ratatui::style::Color::Rgb(122, 136, 152)
        );
        assert_eq!(
            buf[(40, 20)].bg,
            ratatui::style::Color::Rgb(224, 240, 255)
        );
    }

    #[test]
    fn test_text() {
        let buf = render(&state(), 80, 21);
        let text = (0..21).map(|y| row_text(&buf, y)).collect::<Vec<_>>();
        let find = |needle: &str| {
            text.iter()
                .position(|row| row.contains(needle))
                .unwrap_or_else(|| panic!("`{needle}` not on screen"))
        };
        let time = find("7:03:09");
        assert_eq!(find("2024 05/04"), time + 1);
        assert_eq!(find("Tokyo"), time + 3);
        assert_eq!(find("18.5°C  Overcast"), time + 4);
        assert_eq!(find("Weather fetch failed"), time + 5);
        assert_eq!(find(" 0 Here "), 20);
        assert!(text[20].contains(" 7 Okinawa "));
    }

    #[test]
    fn test_text_contrast() {
        let buf = render(&state(), 80, 21);
        let selector = row_text(&buf, 20);
        let x = selector.find("Here").unwrap() as u16;
        // Light bottom, dark text
        assert_eq!(buf[(x, 20)].fg, ratatui::style::Color::Black);
        assert_eq!(
            buf[(x, 20)].bg,
            ratatui::style::Color::Rgb(224, 240, 255)
        );
    }

    #[test]
    fn test_selected_option_highlighted() {
        let buf = render(&state(), 80, 21);
        let selector = row_text(&buf, 20);
        let tokyo = selector.find("Tokyo").unwrap() as u16;
        let here = selector.find("Here").unwrap() as u16;
        assert!(buf[(tokyo, 20)].modifier.contains(Modifier::REVERSED));
        assert!(!buf[(here, 20)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_tiny_terminal() {
        // Shouldn't panic, even with nowhere to put anything
        render(&state(), 10, 1);
        render(&state(), 0, 0);
    }

    #[test]
    fn test_command() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(command(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(command(key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(
            command(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(
            command(key(KeyCode::Char('h'))),
            Some(Command::Select(LocationChoice::Here))
        );
        assert_eq!(
            command(key(KeyCode::Char('1'))),
            Some(Command::Select(LocationChoice::City(City::Sapporo)))
        );
        assert_eq!(
            command(key(KeyCode::Char('7'))),
            Some(Command::Select(LocationChoice::City(City::Okinawa)))
        );
        assert_eq!(command(key(KeyCode::Char('8'))), None);
        assert_eq!(command(key(KeyCode::Right)), Some(Command::Cycle(1)));
        assert_eq!(command(key(KeyCode::Left)), Some(Command::Cycle(-1)));
        assert_eq!(command(key(KeyCode::Char('c'))), None);
    }
}
