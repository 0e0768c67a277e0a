//! Width-dependent column layout.
//!
//! | width    | visible columns                                  |
//! |----------|--------------------------------------------------|
//! | `< 40`   | symbol, route name (narrowed), arrivals          |
//! | `40..60` | + terminals                                      |
//! | `60..70` | + frequency                                      |
//! | `>= 70`  | + operating hours                                |
//!
//! Every width in [`Columns`] is non-decreasing in the terminal width.

/// Below this width only symbol, name and arrivals are shown.
pub const WIDTH_MINIMAL: u16 = 40;
/// Below this width frequency and hours are hidden.
pub const WIDTH_NO_FREQ_AND_HOURS: u16 = 60;
/// Below this width hours are hidden.
pub const WIDTH_NO_HOURS: u16 = 70;

/// Preferred route-name width.
pub const ROUTE_NAME_PREFERRED: u16 = 5;
/// The route-name column grows above this width...
pub const ROUTE_NAME_GROW_FROM: u16 = 105;
/// ...up to this width.
pub const ROUTE_NAME_GROW_TO: u16 = 115;

/// Terminals column cap while frequency or hours are hidden.
const TERMINALS_NARROW_CAP: u16 = 20;

/// Column x of the route name.
pub const NAME_X: u16 = 5;
/// Width of the operating-hours text.
pub const HOURS_WIDTH: u16 = 13;
/// Width reserved for the frequency text.
pub const FREQUENCY_WIDTH: u16 = 7;
/// Width of the arrivals column.
pub const ARRIVALS_WIDTH: u16 = 12;

/// Column geometry for one terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    /// Terminal width the geometry was computed for.
    pub width: u16,
    /// Route name column width.
    pub route_name_width: u16,
    /// Terminals column width, 0 when hidden.
    pub terminals_width: u16,
    /// Terminals column visible.
    pub show_terminals: bool,
    /// Frequency column visible.
    pub show_frequency: bool,
    /// Operating-hours column visible.
    pub show_hours: bool,
}

/// Computes the column layout for a terminal `width` columns wide.
#[must_use]
pub fn columns(width: u16) -> Columns {
    let route_name_width = route_name_width(width);
    let show_terminals = width >= WIDTH_MINIMAL;
    let show_frequency = width >= WIDTH_NO_FREQ_AND_HOURS;
    let show_hours = width >= WIDTH_NO_HOURS;

    let terminals_width = if !show_terminals {
        0
    } else if !show_frequency {
        (width - 30).min(TERMINALS_NARROW_CAP)
    } else if !show_hours {
        (width - 36).min(TERMINALS_NARROW_CAP)
    } else {
        // The name column's growth comes out of the terminals column.
        width - 50 - (route_name_width - ROUTE_NAME_PREFERRED)
    };

    Columns {
        width,
        route_name_width,
        terminals_width,
        show_terminals,
        show_frequency,
        show_hours,
    }
}

fn route_name_width(width: u16) -> u16 {
    if width < WIDTH_MINIMAL {
        // 5 + w - 23, never wider than preferred
        return width.saturating_sub(18).min(ROUTE_NAME_PREFERRED);
    }
    let growth = width.clamp(ROUTE_NAME_GROW_FROM, ROUTE_NAME_GROW_TO) - ROUTE_NAME_GROW_FROM;
    ROUTE_NAME_PREFERRED + growth
}

impl Columns {
    /// Column x of the type glyph; imminent rows alternate by frame parity.
    #[must_use]
    pub fn symbol_x(&self, imminent: bool, frame_counter: u64) -> u16 {
        if imminent {
            (frame_counter % 2) as u16
        } else {
            0
        }
    }

    /// Column x of the terminals field.
    #[must_use]
    pub fn terminals_x(&self) -> u16 {
        NAME_X + self.route_name_width + 4
    }

    /// Column x of the operating-hours field.
    #[must_use]
    pub fn hours_x(&self) -> u16 {
        self.width.saturating_sub(34)
    }

    /// Column x of the operating-hours header.
    #[must_use]
    pub fn hours_header_x(&self) -> u16 {
        self.width.saturating_sub(33)
    }

    /// Column x of the frequency field.
    #[must_use]
    pub fn frequency_x(&self) -> u16 {
        self.width.saturating_sub(19)
    }

    /// Column x of the frequency header.
    #[must_use]
    pub fn frequency_header_x(&self) -> u16 {
        self.width.saturating_sub(20)
    }

    /// Column x of the arrivals field and header.
    #[must_use]
    pub fn arrivals_x(&self) -> u16 {
        self.width.saturating_sub(ARRIVALS_WIDTH)
    }
}
