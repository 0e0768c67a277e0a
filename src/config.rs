//! Configuration file.
//!
//! YAML with precedence: CLI > file > defaults. Every key is optional.
//!
//! ```yaml
//! poll:
//!   wait_time_secs: 60
//!   timeout_secs: 60
//! proxy:
//!   host: 127.0.0.1
//!   port: 25555
//! ui:
//!   frame_ms: 500
//!   imminent_threshold_secs: 90
//! theme:
//!   imminent: "#9ece6a"
//! ```

use crate::error::{Result, StopboardError};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Poll cycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between polls.
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u64,

    /// Seconds one fetch may take.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_wait_time_secs() -> u64 {
    60
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { wait_time_secs: default_wait_time_secs(), timeout_secs: default_timeout_secs() }
    }
}

/// Transport proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy host name or address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Proxy TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    25555
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Milliseconds to wait for a key each frame.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,

    /// Seconds under which a vehicle counts as imminent.
    #[serde(default = "default_imminent_threshold_secs")]
    pub imminent_threshold_secs: f64,
}

fn default_frame_ms() -> u64 {
    500
}
fn default_imminent_threshold_secs() -> f64 {
    crate::arrivals::DEFAULT_IMMINENT_THRESHOLD_SECS
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_ms: default_frame_ms(),
            imminent_threshold_secs: default_imminent_threshold_secs(),
        }
    }
}

/// Contents of `config.yaml`; every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Poll settings.
    #[serde(default)]
    pub poll: PollConfig,

    /// Proxy settings.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Dashboard settings.
    #[serde(default)]
    pub ui: UiConfig,

    /// Color overrides.
    #[serde(default)]
    pub theme: Theme,
}

impl Config {
    /// `<config_dir>/stopboard/config.yaml`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stopboard").join("config.yaml"))
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// [`StopboardError::ConfigNotFound`] if there is no such file,
    /// [`StopboardError::ConfigRead`] for other read failures, otherwise
    /// whatever [`Config::parse`] reports.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|source| {
            let path = path.display().to_string();
            if source.kind() == std::io::ErrorKind::NotFound {
                StopboardError::ConfigNotFound(path)
            } else {
                StopboardError::ConfigRead { path, source }
            }
        })?;

        Self::parse(&content)
    }

    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// [`StopboardError::ConfigParse`] with the offending line, or
    /// [`StopboardError::ConfigInvalid`] for out-of-range values.
    pub fn parse(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            StopboardError::ConfigParse { line, message: e.to_string() }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given; otherwise the default location, falling
    /// back to defaults if no file exists there.
    ///
    /// # Errors
    ///
    /// An explicit path that is missing is an error; so is any file that
    /// exists but does not parse.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("poll.wait_time_secs", self.poll.wait_time_secs),
            ("poll.timeout_secs", self.poll.timeout_secs),
            ("ui.frame_ms", self.ui.frame_ms),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(invalid(key, "must be greater than zero"));
            }
        }
        if self.proxy.host.trim().is_empty() {
            return Err(invalid("proxy.host", "must not be empty"));
        }
        if !self.ui.imminent_threshold_secs.is_finite() || self.ui.imminent_threshold_secs < 0.0 {
            return Err(invalid("ui.imminent_threshold_secs", "must be a non-negative number"));
        }
        Ok(())
    }

    /// Pause between polls.
    #[must_use]
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.poll.wait_time_secs)
    }

    /// Bound for one fetch.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.poll.timeout_secs)
    }

    /// Key wait per frame.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.ui.frame_ms)
    }
}

fn invalid(key: &str, message: &str) -> StopboardError {
    StopboardError::ConfigInvalid { key: key.to_string(), message: message.to_string() }
}
