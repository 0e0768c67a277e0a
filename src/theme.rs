//! Dashboard colors.
//!
//! Colors are hex strings so they can be overridden from the `theme:`
//! section of the config file.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

/// Colors used by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Default text color.
    pub foreground: String,
    /// Stop name and clocks.
    pub header: String,
    /// Horizontal rule.
    pub rule: String,
    /// Transport group labels and column headers.
    pub group: String,
    /// Rows with a vehicle due shortly.
    pub imminent: String,
    /// Error line.
    pub error: String,
    /// Source footer.
    pub footer: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: "#c0caf5".to_string(),
            header: "#7dcfff".to_string(),
            rule: "#565f89".to_string(),
            group: "#e0af68".to_string(),
            imminent: "#9ece6a".to_string(),
            error: "#f7768e".to_string(),
            footer: "#565f89".to_string(),
        }
    }
}

impl Theme {
    /// Creates the default theme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain row text.
    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(parse_color(&self.foreground))
    }

    /// Header lines.
    #[must_use]
    pub fn header(&self) -> Style {
        Style::default().fg(parse_color(&self.header)).add_modifier(Modifier::BOLD)
    }

    /// Horizontal rule.
    #[must_use]
    pub fn rule(&self) -> Style {
        Style::default().fg(parse_color(&self.rule))
    }

    /// Group labels and column headers.
    #[must_use]
    pub fn group(&self) -> Style {
        Style::default().fg(parse_color(&self.group)).add_modifier(Modifier::BOLD)
    }

    /// Row style, emphasized when a vehicle is imminent.
    #[must_use]
    pub fn row(&self, imminent: bool) -> Style {
        if imminent {
            Style::default().fg(parse_color(&self.imminent)).add_modifier(Modifier::BOLD)
        } else {
            self.text()
        }
    }

    /// Error line.
    #[must_use]
    pub fn error(&self) -> Style {
        Style::default().fg(parse_color(&self.error))
    }

    /// Source footer.
    #[must_use]
    pub fn footer(&self) -> Style {
        Style::default().fg(parse_color(&self.footer)).add_modifier(Modifier::DIM)
    }
}

/// Parses a `#rrggbb` string; anything else falls back to white.
fn parse_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 || !hex.is_ascii() {
        return Color::White;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);

    Color::Rgb(r, g, b)
}
