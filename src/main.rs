//! stopboard: live departure board for one transit stop.
//!
//! Run: `stopboard stopid:<id>` or `stopboard saved_stop.json`

#![cfg_attr(test, allow(clippy::unwrap_used))]

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::time::Duration;
use stopboard::{debug, Config, PollerConfig, Settings, SourceLocator};

/// stopboard: live departure board for one transit stop
#[derive(Parser, Debug)]
#[command(name = "stopboard")]
#[command(version)]
#[command(about = "Terminal departure board for a public transport stop", long_about = None)]
struct Cli {
    /// Stop page URL, `stopid:<id>`, or a saved stop-info JSON file
    source: String,

    /// Transport proxy host
    #[arg(long)]
    proxy_host: Option<String>,

    /// Transport proxy port
    #[arg(long)]
    proxy_port: Option<u16>,

    /// Seconds between polls (default 60)
    #[arg(long = "wait_time", visible_alias = "wait-time", value_name = "SECS",
          value_parser = clap::value_parser!(u64).range(1..))]
    wait_time: Option<u64>,

    /// Seconds to wait for stop info (default 60)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging (STOPBOARD_DEBUG=<level> picks the level)
    #[arg(long)]
    debug: bool,

    /// Append debug log lines to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Merges flags over the file configuration.
    fn settings(&self, source: SourceLocator, config: Config) -> Settings {
        let wait_time = self.wait_time.map_or_else(|| config.wait_time(), Duration::from_secs);
        let timeout = self.timeout.map_or_else(|| config.timeout(), Duration::from_secs);
        Settings {
            source,
            proxy_host: self.proxy_host.clone().unwrap_or_else(|| config.proxy.host.clone()),
            proxy_port: self.proxy_port.unwrap_or(config.proxy.port),
            poller: PollerConfig { interval: wait_time, timeout, ..PollerConfig::default() },
            frame_interval: config.frame_interval(),
            imminent_threshold_secs: config.ui.imminent_threshold_secs,
            theme: config.theme,
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let floor = match (debug::env_level(), cli.debug) {
        (Some(level), _) => level,
        (None, true) => debug::Level::Debug,
        (None, false) => return Ok(()),
    };
    if let Some(path) = &cli.log_file {
        debug::log_to_file(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
    }
    debug::enable_at(floor);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = match SourceLocator::parse(&cli.source) {
        Ok(source) => source,
        Err(e) => Cli::command().error(ErrorKind::MissingRequiredArgument, e).exit(),
    };

    init_logging(&cli)?;
    let config = Config::resolve(cli.config.as_deref()).context("loading configuration")?;

    stopboard::run(cli.settings(source, config))?;
    Ok(())
}
