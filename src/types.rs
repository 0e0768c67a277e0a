//! Core types for the stop board.
//!
//! - [`Snapshot`]: one point-in-time retrieval of a stop
//! - [`Route`]: a line serving the stop, with its [`TransportType`] and [`BriefSchedule`]
//! - [`Event`]: an estimated or scheduled arrival
//! - [`CollectionStatus`]: outcome of the latest poll
//!
//! Stop-info documents are deeply nested and frequently incomplete. Decoding
//! is lenient per field: a malformed field becomes `None` rather than failing
//! the whole document, so one broken route never hides the others. Only a
//! document without `data.properties` is rejected.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Kind of vehicle serving a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// City bus.
    Bus,
    /// Fixed-route minibus.
    Minibus,
    /// Tram.
    Tramway,
    /// Trolleybus.
    Trolleybus,
    /// Suburban train.
    Suburban,
    /// Metro.
    Underground,
    /// Anything the board has no label for.
    Unknown,
}

impl TransportType {
    /// Maps the document's `type` string. Unrecognized strings are [`Self::Unknown`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "bus" => Self::Bus,
            "minibus" => Self::Minibus,
            "tramway" => Self::Tramway,
            "trolleybus" => Self::Trolleybus,
            "suburban" => Self::Suburban,
            "underground" => Self::Underground,
            _ => Self::Unknown,
        }
    }

    /// Glyph drawn at the start of each route row.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Bus => "\u{1F68C}",
            Self::Minibus => "\u{1F690}",
            Self::Tramway => "\u{1F68B}",
            Self::Trolleybus => "\u{1F68E}",
            Self::Suburban => "\u{1F683}",
            Self::Underground => "\u{1F687}",
            Self::Unknown => "\u{2753}",
        }
    }

    /// Group caption shown above the routes of this type.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bus => "АВТОБУСЫ",
            Self::Trolleybus => "ТРОЛЛЕЙБУСЫ",
            Self::Tramway => "ТРАМВАИ",
            Self::Minibus => "МАРШРУТКИ",
            Self::Suburban => "ПРИГОРОДНЫЕ ПОЕЗДА",
            Self::Underground => "МЕТРО",
            Self::Unknown => "ДРУГОЙ ТРАНСПОРТ",
        }
    }
}

/// An upcoming vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Live prediction; `value` is the ETA as a Unix timestamp.
    Estimated {
        /// ETA in seconds since the epoch, `None` when unparsable.
        value: Option<f64>,
    },
    /// Timetable entry with ready-made display text.
    Scheduled {
        /// Display text such as `12:40`, `None` when malformed.
        text: Option<String>,
    },
}

/// Service window and headway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frequency {
    /// First departure, e.g. `05:30`.
    pub begin: Option<String>,
    /// Last departure, e.g. `01:00`.
    pub end: Option<String>,
    /// Headway text, e.g. `15 мин`.
    pub text: Option<String>,
}

/// Condensed schedule of a route at this stop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BriefSchedule {
    /// Operating hours and headway.
    pub frequency: Option<Frequency>,
    /// Upcoming vehicles in document order.
    pub events: Option<Vec<Event>>,
}

/// A line serving the stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Display name, e.g. `12к`.
    pub name: String,
    /// `None` when the document has no `type` for this route.
    pub kind: Option<TransportType>,
    /// Names of the route's essential stops; `None` when absent or malformed.
    pub essential_stops: Option<Vec<String>>,
    /// `None` when the document has no schedule for this route.
    pub schedule: Option<BriefSchedule>,
}

impl Route {
    /// Creates a route with no stops and no schedule.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: Option<TransportType>) -> Self {
        Self { name: name.into(), kind, essential_stops: None, schedule: None }
    }

    /// Sets the essential stops.
    #[must_use]
    pub fn with_stops<S: Into<String>>(mut self, stops: impl IntoIterator<Item = S>) -> Self {
        self.essential_stops = Some(stops.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the brief schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: BriefSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Events of the brief schedule, empty when there are none.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.schedule.as_ref().and_then(|s| s.events.as_deref()).unwrap_or(&[])
    }

    /// Frequency block of the brief schedule, if any.
    #[must_use]
    pub fn frequency(&self) -> Option<&Frequency> {
        self.schedule.as_ref().and_then(|s| s.frequency.as_ref())
    }
}

/// One retrieval of a stop. Replaced wholesale by the next successful poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Stop name; `None` when the document lacks it.
    pub stop_name: Option<String>,
    /// Server clock as sent, e.g. `Fri Oct 16 2026 14:03:11 GMT+0300 (MSK)`.
    pub current_time: String,
    /// Routes in document order.
    pub routes: Vec<Route>,
}

impl Snapshot {
    /// Decodes a stop-info JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Decodes an already parsed stop-info document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let document = RawDocument::deserialize(value)?;
        Ok(document.into())
    }
}

/// Outcome of the latest poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStatus {
    /// No poll has finished yet.
    #[default]
    Pending,
    /// The latest poll produced a snapshot.
    Ok,
    /// The latest poll failed.
    Failed,
}

// ============================================================================
// Wire shape
// ============================================================================

/// Deserializes `T`, mapping any shape mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Deserialize)]
struct RawDocument {
    data: RawData,
}

#[derive(Deserialize)]
struct RawData {
    properties: RawProperties,
}

#[derive(Deserialize)]
struct RawProperties {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, rename = "currentTime", deserialize_with = "lenient")]
    current_time: Option<String>,
    #[serde(default, rename = "StopMetaData", deserialize_with = "lenient")]
    stop_meta: Option<RawStopMeta>,
}

#[derive(Deserialize)]
struct RawStopMeta {
    #[serde(default, rename = "Transport")]
    transport: Vec<Value>,
}

#[derive(Deserialize)]
struct RawRoute {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, rename = "EssentialStops", deserialize_with = "lenient")]
    essential_stops: Option<Vec<RawNamed>>,
    #[serde(default, rename = "BriefSchedule", deserialize_with = "lenient")]
    schedule: Option<RawSchedule>,
}

#[derive(Deserialize)]
struct RawNamed {
    name: String,
}

#[derive(Deserialize)]
struct RawText {
    text: String,
}

#[derive(Deserialize)]
struct RawSchedule {
    #[serde(default, rename = "Frequency", deserialize_with = "lenient")]
    frequency: Option<RawFrequency>,
    #[serde(default, rename = "Events", deserialize_with = "lenient")]
    events: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawFrequency {
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    begin: Option<RawText>,
    #[serde(default, deserialize_with = "lenient")]
    end: Option<RawText>,
}

impl From<RawDocument> for Snapshot {
    fn from(document: RawDocument) -> Self {
        let properties = document.data.properties;
        let routes = properties
            .stop_meta
            .map(|meta| meta.transport)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| RawRoute::deserialize(value).ok())
            .map(Route::from)
            .collect();

        Self {
            stop_name: properties.name,
            current_time: properties.current_time.unwrap_or_default(),
            routes,
        }
    }
}

impl From<RawRoute> for Route {
    fn from(raw: RawRoute) -> Self {
        Self {
            name: raw.name.unwrap_or_default(),
            kind: raw.kind.as_deref().map(TransportType::from_name),
            essential_stops: raw
                .essential_stops
                .map(|stops| stops.into_iter().map(|stop| stop.name).collect()),
            schedule: raw.schedule.map(|schedule| BriefSchedule {
                frequency: schedule.frequency.map(|f| Frequency {
                    begin: f.begin.map(|t| t.text),
                    end: f.end.map(|t| t.text),
                    text: f.text,
                }),
                events: schedule
                    .events
                    .map(|events| events.iter().filter_map(decode_event).collect()),
            }),
        }
    }
}

/// Decodes one entry of `BriefSchedule.Events`; entries of other kinds are dropped.
fn decode_event(value: &Value) -> Option<Event> {
    if let Some(estimated) = value.get("Estimated") {
        let value = match estimated.get("value") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        return Some(Event::Estimated { value });
    }
    value.get("Scheduled").map(|scheduled| Event::Scheduled {
        text: scheduled.get("text").and_then(Value::as_str).map(str::to_string),
    })
}
