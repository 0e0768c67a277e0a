//! Arrival computation and row texts.
//!
//! Estimated events carry absolute Unix timestamps, so they are meaningful
//! only against the server clock of the same snapshot. Without that
//! reference no arrival claims are made at all.

use crate::types::{Event, Route};

/// A route is imminent when a vehicle is due in less than this many seconds.
pub const DEFAULT_IMMINENT_THRESHOLD_SECS: f64 = 90.0;

/// Arrival text longer than this is cut at a word boundary.
pub const ARRIVALS_MAX_CHARS: usize = 12;

/// Shown when a route's essential stops are absent or malformed.
pub const TERMINALS_PLACEHOLDER: &str = "???? - ????";

/// Arrival column content of one route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arrivals {
    /// Minutes of estimated arrivals, then scheduled times, space separated.
    pub text: String,
    /// A vehicle is due within the imminence threshold.
    pub imminent: bool,
}

/// Computes arrivals with the default imminence threshold.
#[must_use]
pub fn compute(route: &Route, reference_timestamp: Option<f64>) -> Arrivals {
    compute_with_threshold(route, reference_timestamp, DEFAULT_IMMINENT_THRESHOLD_SECS)
}

/// Computes the arrival text and imminence of `route`.
///
/// Estimated minutes always come before scheduled times, whatever their
/// order in the document. Negative deltas (vehicle already left) clamp to 0.
#[must_use]
pub fn compute_with_threshold(
    route: &Route,
    reference_timestamp: Option<f64>,
    imminent_threshold_secs: f64,
) -> Arrivals {
    let Some(reference) = reference_timestamp else {
        return Arrivals::default();
    };

    let mut imminent = false;
    let mut estimated: Vec<String> = Vec::new();
    let mut scheduled: Vec<String> = Vec::new();

    for event in route.events() {
        match event {
            Event::Estimated { value: Some(eta) } if eta.is_finite() => {
                let delta = eta - reference;
                if delta < imminent_threshold_secs {
                    imminent = true;
                }
                let minutes = (delta.max(0.0) / 60.0).floor() as i64;
                estimated.push(minutes.to_string());
            }
            Event::Estimated { .. } => {}
            Event::Scheduled { text } => {
                scheduled.push(text.clone().unwrap_or_else(|| "-".to_string()));
            }
        }
    }

    estimated.extend(scheduled);
    Arrivals { text: estimated.join(" "), imminent }
}

/// `first - ... - last` from the essential stops, or the placeholder.
#[must_use]
pub fn terminals_text(route: &Route) -> String {
    match route.essential_stops.as_deref() {
        Some(stops) if !stops.is_empty() => stops.join(" - "),
        _ => TERMINALS_PLACEHOLDER.to_string(),
    }
}

/// `begin - end` with begin right-aligned and end left-aligned to 5 columns.
/// Empty unless both ends are known.
#[must_use]
pub fn operating_hours_text(route: &Route) -> String {
    let Some(freq) = route.frequency() else {
        return String::new();
    };
    match (&freq.begin, &freq.end) {
        (Some(begin), Some(end)) => format!("{begin:>5} - {end:<5}"),
        _ => String::new(),
    }
}

/// Headway text, empty when absent.
#[must_use]
pub fn frequency_text(route: &Route) -> String {
    route.frequency().and_then(|f| f.text.clone()).unwrap_or_default()
}

/// Cuts arrival text to [`ARRIVALS_MAX_CHARS`], dropping a partially cut word.
#[must_use]
pub fn truncate_arrivals(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= ARRIVALS_MAX_CHARS {
        return text.to_string();
    }

    let head: String = chars[..ARRIVALS_MAX_CHARS].iter().collect();
    if chars[ARRIVALS_MAX_CHARS] == ' ' {
        return head.trim_end().to_string();
    }
    match head.rsplit_once(' ') {
        Some((kept, _)) => kept.trim_end().to_string(),
        None => head,
    }
}
