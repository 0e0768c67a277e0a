//! Debug logging for stopboard.
//!
//! Off by default. `--debug` turns it on at [`Level::Debug`];
//! `STOPBOARD_DEBUG` may name a floor instead (`trace`, `debug`, `info`,
//! `warn`, `error`; any other non-empty value other than `0` means `debug`).
//!
//! The dashboard owns the terminal while it runs, so lines go to the file
//! given with `--log-file` when one is set and to stderr otherwise. File
//! lines carry the wall clock because a log file outlives one session.
//!
//! ```text
//! 14:03:11.204 DEBUG stopboard-poller [poller] publishing 12 routes
//! ```

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Environment variable that turns logging on.
pub const ENV_VAR: &str = "STOPBOARD_DEBUG";

/// Lowest level written; `OFF` disables logging.
static FLOOR: AtomicU8 = AtomicU8::new(OFF);
const OFF: u8 = u8::MAX;

/// Optional log file; `None` means stderr.
static SINK: Mutex<Option<File>> = Mutex::new(None);

/// Log levels, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Per-field and per-call detail.
    Trace,
    /// Poll cycles and frame summaries.
    Debug,
    /// Lifecycle: start, quit, shutdown.
    Info,
    /// Recoverable failures.
    Warn,
    /// Failures that end the program.
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Parses a level name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            _ => None,
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Level::Trace => "\x1b[90m",
            Level::Debug => "\x1b[36m",
            Level::Info => "\x1b[32m",
            Level::Warn => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }
}

/// Enables logging at `floor` and above.
pub fn enable_at(floor: Level) {
    FLOOR.store(floor as u8, Ordering::SeqCst);
}

/// Disables logging.
pub fn disable() {
    FLOOR.store(OFF, Ordering::SeqCst);
}

/// Returns true if lines at `level` are written.
#[inline]
pub fn enabled_for(level: Level) -> bool {
    level as u8 >= FLOOR.load(Ordering::Relaxed)
}

/// Level requested through [`ENV_VAR`], if any.
pub fn env_level() -> Option<Level> {
    let value = std::env::var(ENV_VAR).ok()?;
    level_from_env_value(&value)
}

fn level_from_env_value(value: &str) -> Option<Level> {
    let value = value.trim();
    if value.is_empty() || value == "0" {
        return None;
    }
    Some(Level::from_name(value).unwrap_or(Level::Debug))
}

/// Routes log lines to `path` (appending) instead of stderr.
pub fn log_to_file(path: impl AsRef<Path>) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if let Ok(mut sink) = SINK.lock() {
        *sink = Some(file);
    }
    Ok(())
}

fn format_line(level: Level, component: &str, message: &str, colored: bool) -> String {
    let thread = std::thread::current();
    let thread = thread.name().unwrap_or("?");
    let clock = Local::now().format("%H:%M:%S%.3f");
    if colored {
        format!("{clock} {}{:5}\x1b[0m {thread} [{component}] {message}", level.ansi(), level.as_str())
    } else {
        format!("{clock} {:5} {thread} [{component}] {message}", level.as_str())
    }
}

/// Writes one line if `level` passes the floor.
pub fn log(level: Level, component: &str, message: &str) {
    if !enabled_for(level) {
        return;
    }

    if let Ok(mut sink) = SINK.lock() {
        if let Some(file) = sink.as_mut() {
            let _ = writeln!(file, "{}", format_line(level, component, message, false));
            return;
        }
    }
    let _ = writeln!(io::stderr(), "{}", format_line(level, component, message, true));
}

/// Logs at an explicit level; the message is only formatted when written.
#[macro_export]
macro_rules! debug_log {
    ($level:expr, $component:expr, $($arg:tt)*) => {
        if $crate::debug::enabled_for($level) {
            $crate::debug::log($level, $component, &format!($($arg)*));
        }
    };
}

/// Logs at trace level.
#[macro_export]
macro_rules! trace {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Trace, $component, $($arg)*)
    };
}

/// Logs at debug level.
#[macro_export]
macro_rules! debug {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Debug, $component, $($arg)*)
    };
}

/// Logs at info level.
#[macro_export]
macro_rules! info {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Info, $component, $($arg)*)
    };
}

/// Logs at warn level.
#[macro_export]
macro_rules! warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Warn, $component, $($arg)*)
    };
}

/// Logs at error level.
#[macro_export]
macro_rules! error {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Error, $component, $($arg)*)
    };
}

/// Logs how long a scope took when it ends, at trace level.
pub struct TimingGuard {
    component: &'static str,
    operation: Option<String>,
    start: Instant,
}

impl TimingGuard {
    /// Starts timing `operation`. The name is only built when tracing is on.
    pub fn new<S: Into<String>>(component: &'static str, operation: impl FnOnce() -> S) -> Self {
        let operation = enabled_for(Level::Trace).then(|| operation().into());
        Self { component, operation, start: Instant::now() }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if let Some(operation) = &self.operation {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            log(Level::Trace, self.component, &format!("{operation} took {ms:.1}ms"));
        }
    }
}

/// Times the rest of the enclosing scope.
#[macro_export]
macro_rules! time_scope {
    ($component:expr, $operation:expr) => {
        let _timing = $crate::debug::TimingGuard::new($component, || $operation);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_from_name() {
        assert_eq!(Level::from_name("TRACE"), Some(Level::Trace));
        assert_eq!(Level::from_name(" warning "), Some(Level::Warn));
        assert_eq!(Level::from_name("loud"), None);
    }

    #[test]
    fn test_env_values() {
        assert_eq!(level_from_env_value(""), None);
        assert_eq!(level_from_env_value("0"), None);
        assert_eq!(level_from_env_value("1"), Some(Level::Debug));
        assert_eq!(level_from_env_value("info"), Some(Level::Info));
    }

    #[test]
    fn test_plain_line_has_no_escape_codes() {
        let line = format_line(Level::Warn, "poller", "fetch failed", false);
        assert!(!line.contains('\x1b'));
        assert!(line.contains(" WARN "));
        assert!(line.ends_with("[poller] fetch failed"));
    }

    #[test]
    fn test_colored_line_resets() {
        let line = format_line(Level::Error, "render", "boom", true);
        assert!(line.contains("\x1b[31m"));
        assert!(line.contains("\x1b[0m"));
    }

    #[test]
    fn test_floor_filters_levels_and_timing() {
        enable_at(Level::Warn);
        assert!(!enabled_for(Level::Info));
        assert!(enabled_for(Level::Error));
        let guard = TimingGuard::new("test", || -> String { unreachable!("not built") });
        assert!(guard.operation.is_none());
        drop(guard);

        disable();
        assert!(!enabled_for(Level::Error));
    }
}
