//! Dashboard rendering.
//!
//! Each frame is drawn field by field straight into the ratatui buffer.
//! A field that would start outside the current area (typically right
//! after a resize) yields [`RenderError::OutOfBounds`]; the frame skips it
//! and carries on, so one bad field never costs the rest of the frame.
//! Text running past the right edge is clipped.

use crate::arrivals::{self, Arrivals};
use crate::error::RenderError;
use crate::grouping;
use crate::layout::{self, Columns};
use crate::marquee::{self, Marquee};
use crate::store::{StoreView, TimedSnapshot};
use crate::theme::Theme;
use crate::types::{CollectionStatus, TransportType};
use crate::{debug, trace};
use chrono::{DateTime, Local};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::Frame;

const STOP_CAPTION: &str = "ОСТАНОВКА : ";
const TIME_CAPTION: &str = "ВРЕМЯ     : ";
const UPDATED_CAPTION: &str = "ОБНОВЛЕНО : ";
const SOURCE_CAPTION: &str = "ИСТОЧНИК ДАННЫХ: ";
const CLOCK_FORMAT: &str = "%H:%M:%S";
const NO_CLOCK: &str = "--:--:--";

/// Header placeholder while the first poll is running.
pub const COLLECTING: &str = "ИДЕТ СБОР ДАННЫХ";
/// Header placeholder when polling failed and nothing was ever received.
pub const NO_DATA: &str = "НЕТ ДАННЫХ";
/// Header placeholder for a snapshot without a stop name.
pub const UNKNOWN_STOP: &str = "????";

/// Counts of fields drawn and skipped in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Fields written to the buffer.
    pub drawn: usize,
    /// Fields skipped because they fell outside the area.
    pub skipped: usize,
}

/// Row texts of one route before layout is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// Type glyph.
    pub symbol: &'static str,
    /// Route name.
    pub name: String,
    /// Essential stops or the placeholder.
    pub terminals: String,
    /// Operating hours, possibly empty.
    pub hours: String,
    /// Headway, possibly empty.
    pub frequency: String,
    /// Arrival text and imminence.
    pub arrivals: Arrivals,
}

/// One transport type's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    /// Transport type of the group.
    pub kind: TransportType,
    /// Rows in natural name order.
    pub rows: Vec<RowView>,
}

/// Groups, sorts and computes the row texts of a snapshot.
#[must_use]
pub fn build_groups(timed: &TimedSnapshot, imminent_threshold_secs: f64) -> Vec<GroupView> {
    grouping::group(&timed.snapshot.routes)
        .into_iter()
        .map(|group| GroupView {
            kind: group.kind,
            rows: group
                .routes
                .into_iter()
                .map(|route| RowView {
                    symbol: group.kind.symbol(),
                    name: route.name.clone(),
                    terminals: arrivals::terminals_text(route),
                    hours: arrivals::operating_hours_text(route),
                    frequency: arrivals::frequency_text(route),
                    arrivals: arrivals::compute_with_threshold(
                        route,
                        timed.reference_timestamp,
                        imminent_threshold_secs,
                    ),
                })
                .collect(),
        })
        .collect()
}

/// Text after the stop caption.
#[must_use]
pub fn header_title(view: &StoreView) -> &str {
    match &view.snapshot {
        Some(timed) => timed.snapshot.stop_name.as_deref().unwrap_or(UNKNOWN_STOP),
        None => match view.status {
            CollectionStatus::Pending => COLLECTING,
            CollectionStatus::Failed => NO_DATA,
            CollectionStatus::Ok => UNKNOWN_STOP,
        },
    }
}

/// Marker drawn after a retained stop name while polling is failing.
#[must_use]
pub fn header_status(view: &StoreView) -> Option<String> {
    if view.status != CollectionStatus::Failed || view.snapshot.is_none() {
        return None;
    }
    match view.error.as_deref().filter(|e| !e.is_empty()) {
        Some(error) => Some(format!("[{NO_DATA}: {error}]")),
        None => Some(format!("[{NO_DATA}]")),
    }
}

/// Bounds-checked writer over one frame's buffer.
struct Canvas<'b> {
    buf: &'b mut Buffer,
    area: Rect,
    summary: FrameSummary,
}

impl<'b> Canvas<'b> {
    fn new(buf: &'b mut Buffer, area: Rect) -> Self {
        Self { buf, area, summary: FrameSummary::default() }
    }

    /// Writes `text` at `(x, y)` relative to the area, clipped at the right edge.
    fn put(&mut self, x: u16, y: u16, text: &str, style: Style) -> Result<(), RenderError> {
        if text.is_empty() {
            return Ok(());
        }
        if x >= self.area.width || y >= self.area.height {
            return Err(RenderError::OutOfBounds {
                x,
                y,
                width: self.area.width,
                height: self.area.height,
            });
        }
        let room = usize::from(self.area.width - x);
        self.buf.set_stringn(self.area.x + x, self.area.y + y, text, room, style);
        Ok(())
    }

    /// Draws one field, recording rather than propagating a failure.
    fn field(&mut self, name: &str, x: u16, y: u16, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        match self.put(x, y, text, style) {
            Ok(()) => self.summary.drawn += 1,
            Err(e) => {
                trace!("render", "skipped {name}: {e}");
                self.summary.skipped += 1;
            }
        }
    }
}

/// Draws the dashboard from a store view.
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    source_label: String,
    imminent_threshold_secs: f64,
}

impl Renderer {
    /// Creates a renderer showing `source_label` in the footer.
    #[must_use]
    pub fn new(theme: Theme, source_label: impl Into<String>, imminent_threshold_secs: f64) -> Self {
        Self { theme, source_label: source_label.into(), imminent_threshold_secs }
    }

    /// Draws one frame into `frame`.
    pub fn draw(
        &self,
        frame: &mut Frame<'_>,
        view: &StoreView,
        now: DateTime<Local>,
        frame_counter: u64,
    ) -> FrameSummary {
        let area = frame.area();
        self.render(frame.buffer_mut(), area, view, now, frame_counter)
    }

    /// Draws one frame into `area` of `buf`.
    pub fn render(
        &self,
        buf: &mut Buffer,
        area: Rect,
        view: &StoreView,
        now: DateTime<Local>,
        frame_counter: u64,
    ) -> FrameSummary {
        let mut canvas = Canvas::new(buf, area);
        let cols = layout::columns(area.width);

        let mut line = self.draw_header(&mut canvas, view, now);
        line += 1;

        if let Some(timed) = &view.snapshot {
            for group in build_groups(timed, self.imminent_threshold_secs) {
                line = self.draw_group_header(&mut canvas, &cols, line, group.kind);
                for row in &group.rows {
                    self.draw_row(&mut canvas, &cols, line, row, frame_counter);
                    line = line.saturating_add(1);
                }
                line = line.saturating_add(1);
            }
        }

        let height = area.height;
        if let Some(error) = view.error.as_deref().filter(|e| !e.is_empty()) {
            canvas.field("error", 0, height.saturating_sub(2), error, self.theme.error());
        }
        let footer = format!("{SOURCE_CAPTION}{}", self.source_label);
        canvas.field("footer", 0, height.saturating_sub(1), &footer, self.theme.footer());

        if canvas.summary.skipped > 0 {
            debug!(
                "render",
                "frame {frame_counter}: {} fields drawn, {} skipped in {}x{}",
                canvas.summary.drawn,
                canvas.summary.skipped,
                area.width,
                area.height
            );
        }
        canvas.summary
    }

    /// Stop name, clocks and rule. Returns the next free line.
    fn draw_header(&self, canvas: &mut Canvas<'_>, view: &StoreView, now: DateTime<Local>) -> u16 {
        let style = self.theme.header();
        let width = canvas.area.width;

        canvas.field("stop caption", 0, 0, STOP_CAPTION, style);
        let title = header_title(view);
        canvas.field("stop name", 12, 0, title, style);
        if let Some(status) = header_status(view) {
            let x = u16::try_from(title.chars().count()).unwrap_or(u16::MAX).saturating_add(13);
            canvas.field("stop status", x, 0, &status, self.theme.error());
        }

        let clock = format!("{TIME_CAPTION}{}", now.format(CLOCK_FORMAT));
        canvas.field("clock", 0, 1, &clock, style);
        let updated = view
            .last_update
            .map_or_else(|| NO_CLOCK.to_string(), |t| t.format(CLOCK_FORMAT).to_string());
        let updated = format!("{UPDATED_CAPTION}{updated}");
        canvas.field("update time", width.saturating_sub(21), 1, &updated, style);

        canvas.field("rule", 0, 2, &"-".repeat(usize::from(width)), self.theme.rule());
        3
    }

    /// Group label and column headers. Returns the next free line.
    fn draw_group_header(&self, canvas: &mut Canvas<'_>, cols: &Columns, line: u16, kind: TransportType) -> u16 {
        let style = self.theme.group();
        let width = usize::from(cols.width);

        let label = center(kind.label(), width);
        canvas.field("group label", 0, line, label.trim_end(), style);

        let line = line.saturating_add(1);
        canvas.field("number header", 3, line, "НОМЕР", style);
        if cols.show_terminals {
            let title = center("МАРШРУТ", usize::from(cols.terminals_width));
            canvas.field("terminals header", cols.terminals_x(), line, title.trim_end(), style);
        }
        if cols.show_hours {
            canvas.field("hours header", cols.hours_header_x(), line, "ЧАСЫ РАБОТЫ", style);
        }
        if cols.show_frequency {
            canvas.field("frequency header", cols.frequency_header_x(), line, "ЧАСТОТА", style);
        }
        canvas.field("arrivals header", cols.arrivals_x(), line, "БЛИЖАЙШИЕ", style);
        line.saturating_add(1)
    }

    fn draw_row(&self, canvas: &mut Canvas<'_>, cols: &Columns, line: u16, row: &RowView, frame_counter: u64) {
        let imminent = row.arrivals.imminent;
        let style = self.theme.row(imminent);

        canvas.field("symbol", cols.symbol_x(imminent, frame_counter), line, row.symbol, style);

        if cols.route_name_width > 0 {
            let name = marquee::slice(&row.name, usize::from(cols.route_name_width), frame_counter);
            canvas.field("route name", layout::NAME_X, line, &name, style);
        }
        if cols.show_terminals {
            let terminals =
                Marquee::TERMINALS.slice(&row.terminals, usize::from(cols.terminals_width), frame_counter);
            canvas.field("terminals", cols.terminals_x(), line, &terminals, style);
        }
        if cols.show_hours {
            canvas.field("hours", cols.hours_x(), line, &row.hours, style);
        }
        if cols.show_frequency {
            canvas.field("frequency", cols.frequency_x(), line, &row.frequency, style);
        }
        let arrivals = arrivals::truncate_arrivals(&row.arrivals.text);
        canvas.field("arrivals", cols.arrivals_x(), line, &arrivals, style);
    }
}

/// Centers `text` in `width` columns, extra space going right.
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(width - len - left))
}
