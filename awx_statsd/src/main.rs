//! AWX StatsD bridge
//!
//! Scrapes the metrics api of an AWX server once, and forwards every sample to a local StatsD
//! listener as a gauge.

mod config;
mod forward;
mod logging;

use log::{debug, info, warn};
use std::io;
use std::process::ExitCode;
use thiserror::Error;

use awx_prometheus::debug::RunStats;
use awx_prometheus::error::{debug_error, error_chain};
use awx_prometheus::parser::{self, ParseError};
use awx_prometheus::scrape::{ScrapeError, ScrapeTarget, SCRAPE_TIMEOUT};

use crate::config::{Config, ConfigError, Environment, USAGE};
use crate::forward::Forwarder;

#[derive(Error, Debug)]
enum RunError {
    #[error("there was an error scraping AWX")]
    Scrape(#[source] ScrapeError),
    #[error("couldn't create the StatsD socket for {addr}")]
    Socket {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Exit status when the config is incomplete (only with `--strict`)
const EXIT_CONFIG: u8 = 2;

/// Exit status when metrics couldn't be scraped (only with `--strict`), or forwarded
const EXIT_FAILURE: u8 = 1;

impl RunError {
    /// Scrape errors only fail the process when `strict` is set
    fn exit_code(&self, strict: bool) -> u8 {
        match self {
            RunError::Scrape(_) if !strict => 0,
            RunError::Scrape(_) | RunError::Socket { .. } => EXIT_FAILURE,
        }
    }
}

/// The program's main entry point.
fn main() -> ExitCode {
    let env = Environment::load();
    let strict = env.strict;
    let config = match Config::from_env(env) {
        Ok(config) => config,
        Err(err) => return config_failed(err, strict),
    };

    logging::init(config.debug, config.log_file.as_deref());
    if config.uses_default_server() {
        warn!("There was no server url provided. Defaulting to localhost");
    }
    if let Some(format) = &config.format {
        debug!("Ignoring output format {:?}", format);
    }

    match run(&config) {
        Ok(stats) => {
            stats.publish();
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.exit_code(config.strict);
            let err = anyhow::Error::new(err);
            debug_error(&err);
            println!("{}", error_chain(&err));
            ExitCode::from(code)
        }
    }
}

fn config_failed(err: ConfigError, strict: bool) -> ExitCode {
    println!("The config was not complete: {}.\n{}", err, USAGE);
    ExitCode::from(if strict { EXIT_CONFIG } else { 0 })
}

/// Scrape once, then forward every sample
fn run(config: &Config) -> Result<RunStats, RunError> {
    let mut stats = RunStats::new();

    let target = ScrapeTarget::new(&config.server_url, config.api_token.clone());
    info!("Scraping {}", target.url);
    let input = target.scrape(SCRAPE_TIMEOUT).map_err(RunError::Scrape)?;
    stats.scraped(input.len());
    debug!("Received metrics:\n{}", input);

    let mut forwarder = Forwarder::connect(&config.statsd_addr, config.statsd_transport)
        .map_err(|source| RunError::Socket {
            addr: config.statsd_addr.clone(),
            source,
        })?;
    forward_metrics(&input, &config.prefix, &mut forwarder, &mut stats);
    if let Err(err) = forwarder.close() {
        warn!("Failed to flush StatsD metrics: {}", err);
    }

    Ok(stats)
}

/// Parses the scraped document and forwards each sample.
///
/// Lines that can't be parsed are logged and skipped; a sample with a non-numeric value is
/// still forwarded, as `0`.
fn forward_metrics(input: &str, prefix: &str, forwarder: &mut Forwarder, stats: &mut RunStats) {
    let mut samples = Vec::new();
    for result in parser::parse(input) {
        match result {
            Ok(sample) => {
                for err in sample.errors() {
                    match err {
                        ParseError::MalformedDimension { .. } => stats.dimensions_dropped(1),
                        _ => stats.parse_failed(),
                    }
                    warn!("{}", err);
                }
                stats.sample_parsed();
                samples.push(sample);
            }
            Err(err) => {
                stats.parse_failed();
                warn!("{}", err);
            }
        }
    }
    forwarder.forward(prefix, samples, stats);
}
