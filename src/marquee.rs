//! Scrolling text for fields wider than their column.
//!
//! The window position depends only on the frame counter, so any frame can
//! be reproduced from its counter value.

/// Marquee parameters for one kind of field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marquee {
    /// Spaces appended before the text wraps around.
    pub gap: usize,
    /// Pad text that fits to the full column width.
    pub pad: bool,
}

impl Marquee {
    /// Route names: short gap, padded.
    pub const ROUTE_NAME: Self = Self { gap: 3, pad: true };
    /// Terminal stop lists: wide gap, drawn as is when they fit.
    pub const TERMINALS: Self = Self { gap: 9, pad: false };

    /// Returns the `width`-character window of `text` for `frame_counter`.
    #[must_use]
    pub fn slice(&self, text: &str, width: usize, frame_counter: u64) -> String {
        let len = text.chars().count();
        if len <= width {
            return if self.pad { format!("{text:<width$}") } else { text.to_string() };
        }

        let cycle = len + self.gap;
        let offset = (frame_counter % cycle as u64) as usize;
        text.chars()
            .chain(std::iter::repeat(' ').take(self.gap))
            .cycle()
            .skip(offset)
            .take(width)
            .collect()
    }
}

/// Slices with the route-name parameters.
#[must_use]
pub fn slice(text: &str, width: usize, frame_counter: u64) -> String {
    Marquee::ROUTE_NAME.slice(text, width, frame_counter)
}
