//! Error types for the stop board.
//!
//! Three families live here:
//!
//! - [`FetchError`]: retrieving a stop snapshot failed. Never fatal; the poller
//!   turns it into the store's error text and retries on the next cycle.
//! - [`RenderError`]: a single dashboard field could not be drawn. The frame
//!   orchestrator skips the field and keeps going.
//! - [`StopboardError`]: setup failures (configuration, terminal, CLI source).

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a stop snapshot from a source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Could not connect to the stop-info proxy.
    #[error("cannot connect to proxy {addr}: {source}")]
    Connect {
        /// Proxy address as `host:port`.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// No stop-info result arrived within the allotted time.
    #[error("no stop info received within {0:?}")]
    Timeout(Duration),

    /// The proxy closed the connection before sending a result.
    #[error("proxy closed the connection without a result")]
    ConnectionClosed,

    /// The proxy answered with an error document.
    #[error("proxy error: {0}")]
    Remote(String),

    /// Socket or file I/O failed mid-transfer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document is not a stop-info document.
    #[error("malformed stop info: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure to parse the server-reported current time.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// The string is empty or missing.
    #[error("server time is missing")]
    Missing,

    /// The string does not match `Www Mmm dd yyyy HH:MM:SS GMT+hhmm (TZ)`.
    #[error("unrecognized server time '{text}': {source}")]
    Format {
        /// Offending text.
        text: String,
        /// Parser error.
        #[source]
        source: chrono::ParseError,
    },
}

/// Failure to draw one dashboard field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The field's anchor lies outside the current drawing area.
    #[error("field at ({x}, {y}) is outside the {width}x{height} area")]
    OutOfBounds {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
        /// Area width.
        width: u16,
        /// Area height.
        height: u16,
    },
}

/// Crate-level error for setup and lifecycle operations.
#[derive(Debug, Error)]
pub enum StopboardError {
    /// The config file is not valid YAML for [`crate::Config`].
    #[error("config line {line}: {message}")]
    ConfigParse {
        /// 1-based line of the offending token.
        line: usize,
        /// Parser message.
        message: String,
    },

    /// `--config` named a file that does not exist.
    #[error("config file {0} does not exist")]
    ConfigNotFound(String),

    /// The config file exists but could not be read.
    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        /// Path as given.
        path: String,
        /// Underlying read error.
        #[source]
        source: io::Error,
    },

    /// A config value parsed but is out of range.
    #[error("config key {key}: {message}")]
    ConfigInvalid {
        /// Dotted key, e.g. `poll.wait_time_secs`.
        key: String,
        /// Why the value is invalid.
        message: String,
    },

    /// The positional source argument is empty.
    #[error("no source URL, station id or filename provided")]
    MissingSource,

    /// Entering, drawing to or leaving the terminal failed.
    #[error("terminal: {0}")]
    Terminal(#[from] io::Error),
}

/// Result type alias for crate-level operations.
pub type Result<T> = std::result::Result<T, StopboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_error_includes_line_number() {
        let err = StopboardError::ConfigParse { line: 42, message: "invalid value".to_string() };
        let display = err.to_string();

        assert!(display.contains("42"), "Error should include line number: {display}");
        assert!(display.contains("invalid value"), "Error should include message: {display}");
    }

    #[test]
    fn test_config_invalid_includes_key() {
        let err = StopboardError::ConfigInvalid {
            key: "poll.wait_time_secs".to_string(),
            message: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("poll.wait_time_secs"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no tty");
        let err: StopboardError = io_err.into();
        assert!(matches!(err, StopboardError::Terminal(_)));
        assert!(err.to_string().contains("no tty"));
    }

    #[test]
    fn test_fetch_connect_includes_address() {
        let err = FetchError::Connect {
            addr: "127.0.0.1:25555".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        let display = err.to_string();
        assert!(display.contains("127.0.0.1:25555"));
        assert!(display.contains("refused"));
    }

    #[test]
    fn test_fetch_timeout_includes_duration() {
        let err = FetchError::Timeout(Duration::from_secs(60));
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn test_render_error_reports_area() {
        let err = RenderError::OutOfBounds { x: 90, y: 3, width: 80, height: 24 };
        let display = err.to_string();
        assert!(display.contains("(90, 3)"));
        assert!(display.contains("80x24"));
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FetchError>();
        assert_send_sync::<StopboardError>();
        assert_send_sync::<RenderError>();
    }
}
