//! # stopboard
//!
//! Terminal departure board for a single public-transport stop.
//!
//! A background [`poller::Poller`] fetches stop snapshots through the
//! transport proxy (or from a saved JSON document) and publishes them to a
//! [`store::SnapshotStore`]. The render loop in [`app`] reads the store each
//! frame and draws routes grouped by transport type, with live arrival
//! minutes, scrolling route descriptions and columns that adapt to the
//! terminal width.
//!
//! ```rust,ignore
//! use stopboard::marquee;
//!
//! assert_eq!(marquee::slice("HELLO", 3, 1), "ELL");
//! ```

#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Data
// ============================================================================

/// Error types.
pub mod error;

/// Stop snapshot data model and lenient decoding.
pub mod types;

/// Server time parsing.
pub mod timestamp;

// ============================================================================
// Collection
// ============================================================================

/// Stop-info sources: transport proxy and JSON files.
pub mod source;

/// Shared snapshot store.
pub mod store;

/// Background poller and cancellation.
pub mod poller;

// ============================================================================
// Presentation
// ============================================================================

/// Route grouping and natural ordering.
pub mod grouping;

/// Arrival computation and row texts.
pub mod arrivals;

/// Width-dependent column layout.
pub mod layout;

/// Scrolling text.
pub mod marquee;

/// Colors.
pub mod theme;

/// Frame rendering.
pub mod ui;

// ============================================================================
// Application
// ============================================================================

/// Configuration file.
pub mod config;

/// Debug logging.
pub mod debug;

/// Key handling.
pub mod input;

/// Main loop.
pub mod app;

pub use app::{run, Settings};
pub use config::Config;
pub use error::{FetchError, RenderError, Result, StopboardError, TimestampError};
pub use poller::{CancellationToken, Poller, PollerConfig};
pub use source::{SourceLocator, StopInfoSource};
pub use store::{SnapshotStore, StoreView, TimedSnapshot};
pub use types::{CollectionStatus, Route, Snapshot, TransportType};
